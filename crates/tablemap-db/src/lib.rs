//! # tablemap-db
//!
//! Entity metadata and SQL expression builders. Entity types declare their
//! table, columns, primary keys, and relations once in an
//! [`EntityRegistry`](registry::EntityRegistry); query code then builds
//! predicate, ordering, grouping, and join [`Expression`](query::Expression)
//! trees over those declarations by property name instead of column name.
//!
//! Rendering the trees to SQL text and binding parameters is left to the
//! caller's SQL engine.
//!
//! ## Module Overview
//!
//! - [`model`] - The [`Entity`](model::Entity) trait and [`EntityMetadata`](model::EntityMetadata)
//! - [`registry`] - The metadata registry and the declaration builder
//! - [`fields`] - [`FieldMapping`](fields::FieldMapping) and [`FieldSet`](fields::FieldSet)
//! - [`relations`] - Declared Foreign and Join links
//! - [`query`] - The Expression tree and every builder
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum

// doc_markdown: backtick requirements for documentation items are too strict
// needless_pass_by_value: builder signatures take owned operands
// return_self_not_must_use: builder pattern methods are self-documenting
// should_implement_trait: `not` and `eq` on builders mirror the predicate vocabulary
// use_self: explicit type names are clearer in expression constructors and match arms
// missing_const_for_fn: accessors that clone or look up metadata are not meaningfully const
// option_if_let_else: `match` on an optional alias reads more clearly than `map_or_else`
// significant_drop_tightening: registry read guards span the whole lookup chain
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::use_self)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::significant_drop_tightening)]

pub mod fields;
pub mod model;
pub mod query;
pub mod registry;
pub mod relations;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use fields::{DataType, FieldMapping, FieldSet};
pub use model::{Entity, EntityKey, EntityMetadata, Field, Property};
pub use query::{
    BaseExpressionBuilder, BinaryOp, BoolOp, ColumnResolver, Expression, GroupExpressionBuilder,
    JoinExpressionBuilder, Operand, OrderExpressionBuilder, RelationResolver, UnaryOp,
    WhereExpressionBuilder,
};
pub use registry::{EntityDeclaration, EntityRegistry, REGISTRY};
pub use relations::{RelationContext, RelationKind, RelationLink, RelationShape};
pub use value::Value;

/// Everything needed to declare entities and build expressions.
pub mod prelude {
    pub use crate::fields::DataType;
    pub use crate::model::{Entity, Field, Property};
    pub use crate::query::{
        ColumnResolver, Expression, GroupExpressionBuilder, JoinExpressionBuilder,
        OrderExpressionBuilder, RelationResolver, WhereExpressionBuilder,
    };
    pub use crate::registry::{EntityDeclaration, EntityRegistry, REGISTRY};
    pub use crate::relations::{RelationKind, RelationShape};
    pub use crate::value::Value;
}
