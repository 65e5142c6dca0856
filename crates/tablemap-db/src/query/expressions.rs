//! The expression tree produced by the builders.
//!
//! [`Expression`] nodes are column references, literal placeholders, unary
//! and binary operators, and n-ary boolean combinators. The builders only
//! construct and compose these nodes. Rendering to SQL text and binding the
//! literal parameters is left to the engine that consumes the tree, which is
//! why the tree is serde-serializable.
//!
//! # Examples
//!
//! ```
//! use tablemap_db::query::expressions::{BinaryOp, Expression};
//!
//! // e.salary > 1000 AND e.active = true
//! let predicate = Expression::binary(BinaryOp::Gt, Expression::column("e.salary"), Expression::literal(1000))
//!     & Expression::binary(BinaryOp::Eq, Expression::column("e.active"), Expression::literal(true));
//! assert!(matches!(predicate, Expression::Combine { .. }));
//! ```

use std::ops;

use serde::Serialize;
use tablemap_core::{TableMapError, TableMapResult};

use crate::value::Value;

/// A node in a predicate, ordering, or grouping tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    /// A column reference, already alias-qualified (e.g. `e.first_name`).
    Column {
        /// The qualified column name.
        name: String,
    },
    /// A literal placeholder, bound as a parameter by the renderer.
    Literal {
        /// The bound value.
        value: Value,
    },
    /// A unary operator applied to one operand.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expression>,
    },
    /// A binary operator applied to two operands.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left operand.
        left: Box<Expression>,
        /// The right operand.
        right: Box<Expression>,
    },
    /// An n-ary boolean combination.
    Combine {
        /// AND or OR.
        op: BoolOp,
        /// The combined predicates (two or more).
        operands: Vec<Expression>,
    },
    /// Opaque SQL with parameters, used for sub-selects and computed operands.
    Raw {
        /// The SQL fragment.
        sql: String,
        /// Parameters referenced by the fragment.
        params: Vec<Value>,
    },
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
    /// Logical negation.
    Not,
    /// `IS NULL`.
    IsNull,
    /// `IS NOT NULL`.
    IsNotNull,
}

impl UnaryOp {
    /// Returns the SQL keyword for this operator.
    pub const fn sql_keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Not => "NOT",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Returns `true` for the ordering operators.
    pub const fn is_order(&self) -> bool {
        matches!(self, Self::Asc | Self::Desc)
    }
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
}

impl BinaryOp {
    /// Returns the SQL operator token.
    pub const fn sql_operator(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }
}

/// Boolean combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolOp {
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
}

/// The right-hand side of a comparison: a literal or a nested expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal, passed through untyped for parameter binding.
    Value(Value),
    /// A nested expression such as a column, sub-select, or computation.
    Expr(Expression),
}

impl From<Operand> for Expression {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Value(value) => Self::Literal { value },
            Operand::Expr(expr) => expr,
        }
    }
}

impl From<Expression> for Operand {
    fn from(expr: Expression) -> Self {
        Self::Expr(expr)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

macro_rules! operand_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Self::Value(Value::from(v))
                }
            }
        )*
    };
}

operand_from_value!(
    bool,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    String,
    &str,
    Vec<u8>,
    Vec<Value>,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveTime,
    uuid::Uuid,
    serde_json::Value,
);

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Self::Value(Value::from(v))
    }
}

impl Expression {
    /// Creates a column reference from an already-qualified name.
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column { name: name.into() }
    }

    /// Creates a literal placeholder.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    /// Creates an opaque SQL fragment with parameters.
    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self::Raw {
            sql: sql.into(),
            params,
        }
    }

    /// Applies a unary operator.
    pub fn unary(op: UnaryOp, operand: Self) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Applies a binary operator.
    pub fn binary(op: BinaryOp, left: Self, right: impl Into<Operand>) -> Self {
        let right: Operand = right.into();
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(Self::from(right)),
        }
    }

    /// Combines predicates with AND, flattening nested ANDs.
    ///
    /// A single predicate is returned unchanged; an empty list is an error.
    pub fn and_all(predicates: impl IntoIterator<Item = Self>) -> TableMapResult<Self> {
        Self::combine(BoolOp::And, predicates)
    }

    /// Combines predicates with OR, flattening nested ORs.
    ///
    /// A single predicate is returned unchanged; an empty list is an error.
    pub fn or_all(predicates: impl IntoIterator<Item = Self>) -> TableMapResult<Self> {
        Self::combine(BoolOp::Or, predicates)
    }

    /// Negates a predicate. Double negation cancels out.
    pub fn negate(predicate: Self) -> Self {
        match predicate {
            Self::Unary {
                op: UnaryOp::Not,
                operand,
            } => *operand,
            other => Self::unary(UnaryOp::Not, other),
        }
    }

    fn combine(op: BoolOp, predicates: impl IntoIterator<Item = Self>) -> TableMapResult<Self> {
        let mut operands = Self::flatten(op, predicates);
        match operands.len() {
            0 => Err(TableMapError::InvalidExpression(format!(
                "{op:?} requires at least one predicate"
            ))),
            1 => Ok(operands.remove(0)),
            _ => Ok(Self::Combine { op, operands }),
        }
    }

    /// Joins exactly two predicates, flattening same-operator combinators on
    /// either side.
    fn pair(op: BoolOp, left: Self, right: Self) -> Self {
        Self::Combine {
            op,
            operands: Self::flatten(op, [left, right]),
        }
    }

    fn flatten(op: BoolOp, predicates: impl IntoIterator<Item = Self>) -> Vec<Self> {
        let mut operands = Vec::new();
        for predicate in predicates {
            match predicate {
                Self::Combine {
                    op: inner,
                    operands: children,
                } if inner == op => operands.extend(children),
                other => operands.push(other),
            }
        }
        operands
    }

    /// Returns the qualified name if this is a column reference.
    pub fn column_name(&self) -> Option<&str> {
        match self {
            Self::Column { name } => Some(name),
            _ => None,
        }
    }

    /// Returns the bound value if this is a literal.
    pub const fn literal_value(&self) -> Option<&Value> {
        match self {
            Self::Literal { value } => Some(value),
            _ => None,
        }
    }

    /// Collects every literal value in depth-first, left-to-right order.
    ///
    /// This is the order a renderer binds positional parameters in.
    pub fn params(&self) -> Vec<&Value> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params<'a>(&'a self, out: &mut Vec<&'a Value>) {
        match self {
            Self::Column { .. } => {}
            Self::Literal { value } => out.push(value),
            Self::Unary { operand, .. } => operand.collect_params(out),
            Self::Binary { left, right, .. } => {
                left.collect_params(out);
                right.collect_params(out);
            }
            Self::Combine { operands, .. } => {
                for operand in operands {
                    operand.collect_params(out);
                }
            }
            Self::Raw { params, .. } => out.extend(params.iter()),
        }
    }
}

impl ops::BitAnd for Expression {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::pair(BoolOp::And, self, rhs)
    }
}

impl ops::BitOr for Expression {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::pair(BoolOp::Or, self, rhs)
    }
}

impl ops::Not for Expression {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::negate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(col: &str, v: i64) -> Expression {
        Expression::binary(BinaryOp::Eq, Expression::column(col), v)
    }

    #[test]
    fn test_binary_with_literal_operand() {
        let expr = eq("e.id", 7);
        match expr {
            Expression::Binary { op, left, right } => {
                assert_eq!(op, BinaryOp::Eq);
                assert_eq!(left.column_name(), Some("e.id"));
                assert_eq!(right.literal_value(), Some(&Value::Int(7)));
            }
            other => panic!("Expected Binary, got {other:?}"),
        }
    }

    #[test]
    fn test_binary_with_expression_operand() {
        let sub = Expression::raw("SELECT id FROM department WHERE name = ?", vec!["HR".into()]);
        let expr = Expression::binary(BinaryOp::In, Expression::column("department_id"), sub.clone());
        if let Expression::Binary { right, .. } = expr {
            assert_eq!(*right, sub);
        } else {
            panic!("Expected Binary");
        }
    }

    #[test]
    fn test_and_all_flattens() {
        let inner = Expression::and_all([eq("a", 1), eq("b", 2)]).unwrap();
        let outer = Expression::and_all([inner, eq("c", 3)]).unwrap();
        match outer {
            Expression::Combine { op, operands } => {
                assert_eq!(op, BoolOp::And);
                assert_eq!(operands.len(), 3);
            }
            other => panic!("Expected Combine, got {other:?}"),
        }
    }

    #[test]
    fn test_or_all_does_not_flatten_and() {
        let inner = Expression::and_all([eq("a", 1), eq("b", 2)]).unwrap();
        let outer = Expression::or_all([inner, eq("c", 3)]).unwrap();
        if let Expression::Combine { op, operands } = outer {
            assert_eq!(op, BoolOp::Or);
            assert_eq!(operands.len(), 2);
            assert!(matches!(operands[0], Expression::Combine { op: BoolOp::And, .. }));
        } else {
            panic!("Expected Combine");
        }
    }

    #[test]
    fn test_combine_single_and_empty() {
        assert_eq!(Expression::or_all([eq("a", 1)]).unwrap(), eq("a", 1));
        let err = Expression::and_all(Vec::new()).unwrap_err();
        assert_eq!(err.code(), "invalid_expression");
    }

    #[test]
    fn test_operators_flatten_like_combinators() {
        let combined = (eq("a", 1) & eq("b", 2)) & eq("c", 3);
        assert!(matches!(combined, Expression::Combine { op: BoolOp::And, ref operands } if operands.len() == 3));

        let either = (eq("a", 1) | eq("b", 2)) | (eq("c", 3) | eq("d", 4));
        assert!(matches!(either, Expression::Combine { op: BoolOp::Or, ref operands } if operands.len() == 4));
    }

    #[test]
    fn test_operators_flatten_right_hand_combinator() {
        let nested = eq("a", 1) & (eq("b", 2) & eq("c", 3));
        let combined = Expression::and_all([eq("a", 1), eq("b", 2) & eq("c", 3)]).unwrap();
        assert_eq!(nested, combined);
        assert!(matches!(nested, Expression::Combine { op: BoolOp::And, ref operands } if operands.len() == 3));

        let either = eq("a", 1) | (eq("b", 2) | eq("c", 3));
        assert_eq!(either, Expression::or_all([eq("a", 1), eq("b", 2), eq("c", 3)]).unwrap());

        // A different operator on the right stays nested
        let mixed = eq("a", 1) & (eq("b", 2) | eq("c", 3));
        assert!(matches!(mixed, Expression::Combine { op: BoolOp::And, ref operands } if operands.len() == 2));
    }

    #[test]
    fn test_double_negation() {
        let p = eq("a", 1);
        assert_eq!(!!p.clone(), p);
        assert!(matches!(!p, Expression::Unary { op: UnaryOp::Not, .. }));
    }

    #[test]
    fn test_params_order() {
        let expr = (eq("a", 1) | eq("b", 2))
            & Expression::binary(BinaryOp::Lt, Expression::raw("f(?)", vec![Value::Int(3)]), 4);
        let params: Vec<i64> = expr.params().iter().filter_map(|v| v.as_int()).collect();
        assert_eq!(params, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_option_operand_is_null_literal() {
        let expr = Expression::binary(BinaryOp::Eq, Expression::column("x"), None::<i64>);
        assert_eq!(expr.params(), vec![&Value::Null]);
    }

    #[test]
    fn test_serialize_shape() {
        let json = serde_json::to_value(eq("e.id", 7)).unwrap();
        assert_eq!(json["kind"], "binary");
        assert_eq!(json["op"], "eq");
        assert_eq!(json["left"]["name"], "e.id");
        assert_eq!(json["right"]["value"]["value"], 7);
    }

    #[test]
    fn test_operator_tokens() {
        assert_eq!(BinaryOp::Ne.sql_operator(), "<>");
        assert_eq!(BinaryOp::NotIn.sql_operator(), "NOT IN");
        assert_eq!(UnaryOp::Desc.sql_keyword(), "DESC");
        assert!(UnaryOp::Asc.is_order());
        assert!(!UnaryOp::Not.is_order());
    }
}
