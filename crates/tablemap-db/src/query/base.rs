//! Property-to-column resolution.
//!
//! [`BaseExpressionBuilder`] is the one place a property name is turned into
//! a column reference. Every other builder reaches column data through it, via
//! the [`ColumnResolver`] trait.

use tablemap_core::{TableMapError, TableMapResult};

use crate::fields::FieldSet;
use crate::model::Property;
use crate::query::expressions::Expression;

/// Resolves property names against a [`FieldSet`], qualifying columns with an
/// optional table alias.
///
/// # Examples
///
/// ```
/// use tablemap_db::fields::{DataType, FieldMapping, FieldSet};
/// use tablemap_db::query::base::BaseExpressionBuilder;
///
/// let fields = FieldSet::from_mappings(
///     "employee",
///     [FieldMapping::new("firstName", DataType::Text).column("first_name")],
/// )
/// .unwrap();
///
/// let aliased = BaseExpressionBuilder::new(&fields, Some("e"));
/// assert_eq!(aliased.resolve("firstName").unwrap().column_name(), Some("e.first_name"));
///
/// let bare = BaseExpressionBuilder::new(&fields, None);
/// assert_eq!(bare.resolve("firstName").unwrap().column_name(), Some("first_name"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BaseExpressionBuilder<'a> {
    fields: &'a FieldSet,
    alias: Option<&'a str>,
}

impl<'a> BaseExpressionBuilder<'a> {
    /// Creates a resolver over `fields` with an optional alias.
    pub const fn new(fields: &'a FieldSet, alias: Option<&'a str>) -> Self {
        Self { fields, alias }
    }

    /// The field set properties are resolved against.
    pub const fn fields(&self) -> &'a FieldSet {
        self.fields
    }

    /// The table alias, if any.
    pub const fn alias(&self) -> Option<&'a str> {
        self.alias
    }

    /// Resolves a property to a column reference.
    ///
    /// The column is rendered as `alias.col_name`, or `col_name` with no alias.
    pub fn resolve(&self, property: impl Property) -> TableMapResult<Expression> {
        let name = property.property_name();
        let mapping = self
            .fields
            .get(name)
            .ok_or_else(|| TableMapError::unresolved(self.fields.entity(), name))?;
        Ok(Expression::column(self.qualify(mapping.col_name())))
    }

    /// Resolves every declared field, in declaration order.
    pub fn columns(&self) -> Vec<Expression> {
        self.fields
            .iter()
            .map(|m| Expression::column(self.qualify(m.col_name())))
            .collect()
    }

    fn qualify(&self, col_name: &str) -> String {
        match self.alias {
            Some(alias) => format!("{alias}.{col_name}"),
            None => col_name.to_string(),
        }
    }
}

/// Implemented by every builder that resolves properties through a
/// [`BaseExpressionBuilder`].
pub trait ColumnResolver<'a> {
    /// The underlying resolver.
    fn base(&self) -> &BaseExpressionBuilder<'a>;

    /// Resolves a property to a qualified column reference.
    fn resolve(&self, property: impl Property) -> TableMapResult<Expression> {
        self.base().resolve(property)
    }

    /// The table alias, if any.
    fn alias(&self) -> Option<&'a str> {
        self.base().alias()
    }

    /// The field set properties are resolved against.
    fn fields(&self) -> &'a FieldSet {
        self.base().fields()
    }
}

impl<'a> ColumnResolver<'a> for BaseExpressionBuilder<'a> {
    fn base(&self) -> &BaseExpressionBuilder<'a> {
        self
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
                FieldMapping::new("firstName", DataType::Text).column("first_name"),
                FieldMapping::new("departmentId", DataType::Integer).column("department_id"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_with_alias() {
        let fields = fields();
        let b = BaseExpressionBuilder::new(&fields, Some("e"));
        assert_eq!(b.resolve("departmentId").unwrap(), Expression::column("e.department_id"));
    }

    #[test]
    fn test_resolve_without_alias() {
        let fields = fields();
        let b = BaseExpressionBuilder::new(&fields, None);
        assert_eq!(b.resolve("id").unwrap(), Expression::column("id"));
    }

    #[test]
    fn test_resolve_unknown_property() {
        let fields = fields();
        let b = BaseExpressionBuilder::new(&fields, Some("e"));
        let err = b.resolve("salary").unwrap_err();
        assert!(matches!(
            err,
            TableMapError::UnresolvedProperty { ref entity, ref property }
                if entity == "employee" && property == "salary"
        ));
    }

    #[test]
    fn test_resolve_uses_property_not_column_name() {
        let fields = fields();
        let b = BaseExpressionBuilder::new(&fields, None);
        assert!(b.resolve("first_name").is_err());
    }

    #[test]
    fn test_columns_in_declaration_order() {
        let fields = fields();
        let b = BaseExpressionBuilder::new(&fields, Some("x"));
        let names: Vec<String> = b
            .columns()
            .iter()
            .filter_map(|c| c.column_name().map(str::to_string))
            .collect();
        assert_eq!(names, vec!["x.id", "x.first_name", "x.department_id"]);
    }

    #[test]
    fn test_resolver_trait_delegates() {
        let fields = fields();
        let b = BaseExpressionBuilder::new(&fields, Some("e"));
        assert_eq!(ColumnResolver::alias(&b), Some("e"));
        assert_eq!(ColumnResolver::fields(&b).len(), 3);
        assert_eq!(
            ColumnResolver::resolve(&b, "id").unwrap(),
            BaseExpressionBuilder::resolve(&b, "id").unwrap()
        );
    }
}
