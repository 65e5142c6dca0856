//! Ordering and grouping expressions.

use tablemap_core::TableMapResult;

use crate::fields::FieldSet;
use crate::model::Property;
use crate::query::base::{BaseExpressionBuilder, ColumnResolver};
use crate::query::expressions::{Expression, UnaryOp};

/// Builds `ORDER BY` terms.
///
/// Each term wraps exactly the column expression the base resolver produces
/// in an ascending or descending order node.
#[derive(Debug, Clone, Copy)]
pub struct OrderExpressionBuilder<'a> {
    base: BaseExpressionBuilder<'a>,
}

impl<'a> OrderExpressionBuilder<'a> {
    /// Creates an ordering builder over `fields` with an optional alias.
    pub const fn new(fields: &'a FieldSet, alias: Option<&'a str>) -> Self {
        Self {
            base: BaseExpressionBuilder::new(fields, alias),
        }
    }

    /// Ascending order on a property.
    pub fn asc(&self, property: impl Property) -> TableMapResult<Expression> {
        Ok(Expression::unary(UnaryOp::Asc, self.resolve(property)?))
    }

    /// Descending order on a property.
    pub fn desc(&self, property: impl Property) -> TableMapResult<Expression> {
        Ok(Expression::unary(UnaryOp::Desc, self.resolve(property)?))
    }

    /// Parses an ordering term: `"name"` is ascending, `"-name"` descending.
    pub fn parse(&self, term: &str) -> TableMapResult<Expression> {
        match term.strip_prefix('-') {
            Some(property) => self.desc(property),
            None => self.asc(term),
        }
    }
}

impl<'a> ColumnResolver<'a> for OrderExpressionBuilder<'a> {
    fn base(&self) -> &BaseExpressionBuilder<'a> {
        &self.base
    }
}

/// Builds `GROUP BY` keys.
#[derive(Debug, Clone, Copy)]
pub struct GroupExpressionBuilder<'a> {
    base: BaseExpressionBuilder<'a>,
}

impl<'a> GroupExpressionBuilder<'a> {
    /// Creates a grouping builder over `fields` with an optional alias.
    pub const fn new(fields: &'a FieldSet, alias: Option<&'a str>) -> Self {
        Self {
            base: BaseExpressionBuilder::new(fields, alias),
        }
    }

    /// The unmodified column expression for a property.
    pub fn expr(&self, property: impl Property) -> TableMapResult<Expression> {
        self.resolve(property)
    }

    /// Column expressions for several properties, in argument order.
    ///
    /// Fails on the first unresolved property.
    pub fn exprs<P: Property>(
        &self,
        properties: impl IntoIterator<Item = P>,
    ) -> TableMapResult<Vec<Expression>> {
        properties.into_iter().map(|p| self.resolve(p)).collect()
    }
}

impl<'a> ColumnResolver<'a> for GroupExpressionBuilder<'a> {
    fn base(&self) -> &BaseExpressionBuilder<'a> {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{DataType, FieldMapping};

    fn fields() -> FieldSet {
        FieldSet::from_mappings(
            "employee",
            [
                FieldMapping::new("id", DataType::Integer).primary_key(),
                FieldMapping::new("hiredAt", DataType::DateTime).column("hired_at"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_asc_and_desc_wrap_resolved_column() {
        let fields = fields();
        let order = OrderExpressionBuilder::new(&fields, Some("e"));
        let column = order.resolve("hiredAt").unwrap();

        assert_eq!(
            order.asc("hiredAt").unwrap(),
            Expression::unary(UnaryOp::Asc, column.clone())
        );
        assert_eq!(
            order.desc("hiredAt").unwrap(),
            Expression::unary(UnaryOp::Desc, column)
        );
    }

    #[test]
    fn test_parse_ordering_term() {
        let fields = fields();
        let order = OrderExpressionBuilder::new(&fields, None);
        assert_eq!(order.parse("-id").unwrap(), order.desc("id").unwrap());
        assert_eq!(order.parse("hiredAt").unwrap(), order.asc("hiredAt").unwrap());
    }

    #[test]
    fn test_order_unknown_property() {
        let fields = fields();
        let order = OrderExpressionBuilder::new(&fields, None);
        assert_eq!(order.asc("salary").unwrap_err().code(), "unresolved_property");
        assert!(order.parse("-salary").is_err());
    }

    #[test]
    fn test_group_expr_is_raw_column() {
        let fields = fields();
        let group = GroupExpressionBuilder::new(&fields, Some("e"));
        assert_eq!(group.expr("id").unwrap(), Expression::column("e.id"));
    }

    #[test]
    fn test_group_exprs() {
        let fields = fields();
        let group = GroupExpressionBuilder::new(&fields, None);
        let keys = group.exprs(["hiredAt", "id"]).unwrap();
        assert_eq!(
            keys,
            vec![Expression::column("hired_at"), Expression::column("id")]
        );
        assert!(group.exprs(["id", "nope"]).is_err());
    }
}
