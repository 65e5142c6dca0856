//! Expression builders.
//!
//! - [`base`] - property-to-column resolution, shared by every builder
//! - [`expressions`] - the [`Expression`] tree handed to the renderer
//! - [`lookups`] - predicate construction ([`WhereExpressionBuilder`])
//! - [`ordering`] - `ORDER BY` and `GROUP BY` terms
//! - [`joins`] - join predicates and relation resolution

pub mod base;
pub mod expressions;
pub mod joins;
pub mod lookups;
pub mod ordering;

pub use base::{BaseExpressionBuilder, ColumnResolver};
pub use expressions::{BinaryOp, BoolOp, Expression, Operand, UnaryOp};
pub use joins::{JoinExpressionBuilder, RelationResolver};
pub use lookups::WhereExpressionBuilder;
pub use ordering::{GroupExpressionBuilder, OrderExpressionBuilder};
