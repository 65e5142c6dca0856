//! Predicate construction.
//!
//! [`WhereExpressionBuilder`] turns `(property, operand)` pairs into
//! comparison nodes and composes them with `and`, `or`, and `not`. The
//! left-hand property always goes through the base resolver. The right-hand
//! operand is either a literal, which is handed through untyped for parameter
//! binding, or a nested [`Expression`] such as a sub-select.
//!
//! Operands are not checked against the column's declared
//! [`DataType`](crate::fields::DataType); only the property name is.
//!
//! # Examples
//!
//! ```
//! use tablemap_db::fields::{DataType, FieldMapping, FieldSet};
//! use tablemap_db::query::lookups::WhereExpressionBuilder;
//!
//! let fields = FieldSet::from_mappings(
//!     "employee",
//!     [
//!         FieldMapping::new("firstName", DataType::Text).column("first_name"),
//!         FieldMapping::new("salary", DataType::Integer),
//!     ],
//! )
//! .unwrap();
//!
//! let w = WhereExpressionBuilder::new(&fields, Some("e"));
//! let predicate = w
//!     .and([w.eq("firstName", "Ada").unwrap(), w.gt("salary", 5000).unwrap()])
//!     .unwrap();
//! assert_eq!(predicate.params().len(), 2);
//! ```

use tablemap_core::TableMapResult;

use crate::fields::FieldSet;
use crate::model::Property;
use crate::query::base::{BaseExpressionBuilder, ColumnResolver};
use crate::query::expressions::{BinaryOp, Expression, Operand, UnaryOp};
use crate::value::Value;

/// Builds predicate trees over one entity's fields.
#[derive(Debug, Clone, Copy)]
pub struct WhereExpressionBuilder<'a> {
    base: BaseExpressionBuilder<'a>,
}

impl<'a> WhereExpressionBuilder<'a> {
    /// Creates a predicate builder over `fields` with an optional alias.
    pub const fn new(fields: &'a FieldSet, alias: Option<&'a str>) -> Self {
        Self {
            base: BaseExpressionBuilder::new(fields, alias),
        }
    }

    /// Wraps an existing resolver.
    pub const fn from_base(base: BaseExpressionBuilder<'a>) -> Self {
        Self { base }
    }

    /// `property <op> operand`.
    pub fn compare(
        &self,
        op: BinaryOp,
        property: impl Property,
        operand: impl Into<Operand>,
    ) -> TableMapResult<Expression> {
        Ok(Expression::binary(op, self.resolve(property)?, operand))
    }

    /// `property = operand`.
    pub fn eq(&self, property: impl Property, operand: impl Into<Operand>) -> TableMapResult<Expression> {
        self.compare(BinaryOp::Eq, property, operand)
    }

    /// `property <> operand`.
    pub fn ne(&self, property: impl Property, operand: impl Into<Operand>) -> TableMapResult<Expression> {
        self.compare(BinaryOp::Ne, property, operand)
    }

    /// `property < operand`.
    pub fn lt(&self, property: impl Property, operand: impl Into<Operand>) -> TableMapResult<Expression> {
        self.compare(BinaryOp::Lt, property, operand)
    }

    /// `property <= operand`.
    pub fn lte(&self, property: impl Property, operand: impl Into<Operand>) -> TableMapResult<Expression> {
        self.compare(BinaryOp::Lte, property, operand)
    }

    /// `property > operand`.
    pub fn gt(&self, property: impl Property, operand: impl Into<Operand>) -> TableMapResult<Expression> {
        self.compare(BinaryOp::Gt, property, operand)
    }

    /// `property >= operand`.
    pub fn gte(&self, property: impl Property, operand: impl Into<Operand>) -> TableMapResult<Expression> {
        self.compare(BinaryOp::Gte, property, operand)
    }

    /// `property LIKE pattern`.
    pub fn like(&self, property: impl Property, pattern: impl Into<Operand>) -> TableMapResult<Expression> {
        self.compare(BinaryOp::Like, property, pattern)
    }

    /// `property NOT LIKE pattern`.
    pub fn not_like(
        &self,
        property: impl Property,
        pattern: impl Into<Operand>,
    ) -> TableMapResult<Expression> {
        self.compare(BinaryOp::NotLike, property, pattern)
    }

    /// `property IN operand`, where the operand is a list literal or a sub-select.
    pub fn is_in(&self, property: impl Property, operand: impl Into<Operand>) -> TableMapResult<Expression> {
        self.compare(BinaryOp::In, property, operand)
    }

    /// `property IN (v1, v2, ...)`.
    pub fn in_list<V: Into<Value>>(
        &self,
        property: impl Property,
        values: impl IntoIterator<Item = V>,
    ) -> TableMapResult<Expression> {
        let list: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.is_in(property, list)
    }

    /// `property NOT IN operand`.
    pub fn not_in(&self, property: impl Property, operand: impl Into<Operand>) -> TableMapResult<Expression> {
        self.compare(BinaryOp::NotIn, property, operand)
    }

    /// `property IS NULL`.
    pub fn is_null(&self, property: impl Property) -> TableMapResult<Expression> {
        Ok(Expression::unary(UnaryOp::IsNull, self.resolve(property)?))
    }

    /// `property IS NOT NULL`.
    pub fn is_not_null(&self, property: impl Property) -> TableMapResult<Expression> {
        Ok(Expression::unary(UnaryOp::IsNotNull, self.resolve(property)?))
    }

    /// `property >= low AND property <= high`.
    pub fn between(
        &self,
        property: impl Property,
        low: impl Into<Operand>,
        high: impl Into<Operand>,
    ) -> TableMapResult<Expression> {
        let column = self.resolve(property)?;
        Expression::and_all([
            Expression::binary(BinaryOp::Gte, column.clone(), low),
            Expression::binary(BinaryOp::Lte, column, high),
        ])
    }

    /// Compares two properties of this entity: `left <op> right`.
    pub fn compare_columns(
        &self,
        op: BinaryOp,
        left: impl Property,
        right: impl Property,
    ) -> TableMapResult<Expression> {
        let right = self.resolve(right)?;
        self.compare(op, left, right)
    }

    /// `left = right` over two properties of this entity.
    pub fn eq_column(&self, left: impl Property, right: impl Property) -> TableMapResult<Expression> {
        self.compare_columns(BinaryOp::Eq, left, right)
    }

    /// Combines predicates with AND.
    pub fn and(&self, predicates: impl IntoIterator<Item = Expression>) -> TableMapResult<Expression> {
        Expression::and_all(predicates)
    }

    /// Combines predicates with OR.
    pub fn or(&self, predicates: impl IntoIterator<Item = Expression>) -> TableMapResult<Expression> {
        Expression::or_all(predicates)
    }

    /// Negates a predicate.
    pub fn not(&self, predicate: Expression) -> Expression {
        Expression::negate(predicate)
    }
}

impl<'a> ColumnResolver<'a> for WhereExpressionBuilder<'a> {
    fn base(&self) -> &BaseExpressionBuilder<'a> {
        &self.base
    }
}
