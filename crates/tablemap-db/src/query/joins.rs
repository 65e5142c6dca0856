//! Join predicates and relation resolution.
//!
//! [`JoinExpressionBuilder`] pairs two column resolvers, one per side of a
//! join, and emits column-to-column predicates. [`RelationResolver`] turns a
//! declared [`RelationLink`](crate::relations::RelationLink) into a predicate
//! by looking up the target entity in a registry, binding a
//! [`WhereExpressionBuilder`] to the target's fields, and running the link's
//! shape against it.

use tablemap_core::{TableMapError, TableMapResult, SETTINGS};

use crate::model::{Entity, EntityMetadata, Property};
use crate::query::base::{BaseExpressionBuilder, ColumnResolver};
use crate::query::expressions::{BinaryOp, Expression};
use crate::query::lookups::WhereExpressionBuilder;
use crate::registry::EntityRegistry;
use crate::relations::{RelationContext, RelationKind, RelationLink, RelationShape};

/// Builds predicates linking a source table to a target table.
///
/// # Examples
///
/// ```
/// use tablemap_db::fields::{DataType, FieldMapping, FieldSet};
/// use tablemap_db::query::base::BaseExpressionBuilder;
/// use tablemap_db::query::joins::JoinExpressionBuilder;
///
/// let employee = FieldSet::from_mappings(
///     "Employee",
///     [FieldMapping::new("departmentId", DataType::Integer).column("department_id")],
/// )
/// .unwrap();
/// let department = FieldSet::from_mappings(
///     "Department",
///     [FieldMapping::new("id", DataType::Integer).primary_key()],
/// )
/// .unwrap();
///
/// let join = JoinExpressionBuilder::new(
///     BaseExpressionBuilder::new(&employee, Some("e")),
///     BaseExpressionBuilder::new(&department, Some("d")),
/// );
/// let on = join.on("departmentId", "id").unwrap();
/// assert_eq!(on.params().len(), 0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct JoinExpressionBuilder<'a> {
    source: BaseExpressionBuilder<'a>,
    target: BaseExpressionBuilder<'a>,
}

impl<'a> JoinExpressionBuilder<'a> {
    /// Creates a join builder from the source (parent) and target resolvers.
    pub const fn new(source: BaseExpressionBuilder<'a>, target: BaseExpressionBuilder<'a>) -> Self {
        Self { source, target }
    }

    /// The parent side.
    pub const fn source(&self) -> &BaseExpressionBuilder<'a> {
        &self.source
    }

    /// The target side.
    pub const fn target(&self) -> &BaseExpressionBuilder<'a> {
        &self.target
    }

    /// `target.target_property = source.source_property`.
    pub fn on(
        &self,
        source_property: impl Property,
        target_property: impl Property,
    ) -> TableMapResult<Expression> {
        self.on_op(BinaryOp::Eq, source_property, target_property)
    }

    /// `target.target_property <op> source.source_property`.
    pub fn on_op(
        &self,
        op: BinaryOp,
        source_property: impl Property,
        target_property: impl Property,
    ) -> TableMapResult<Expression> {
        let left = self.target.resolve(target_property)?;
        let right = self.source.resolve(source_property)?;
        Ok(Expression::binary(op, left, right))
    }
}

/// Resolves declared relations into predicates.
///
/// Nothing is cached: every call looks the target up again and returns a
/// fresh tree, since aliases differ between queries.
#[derive(Debug, Clone, Copy)]
pub struct RelationResolver<'r> {
    registry: &'r EntityRegistry,
    qualify_unaliased: bool,
}

impl<'r> RelationResolver<'r> {
    /// Creates a resolver over `registry`, honoring the configured
    /// `qualify_unaliased_relations` setting.
    pub fn new(registry: &'r EntityRegistry) -> Self {
        Self {
            registry,
            qualify_unaliased: SETTINGS.get_or_default().qualify_unaliased_relations,
        }
    }

    /// Overrides whether an unaliased target is qualified by its table name.
    #[must_use]
    pub const fn qualify_unaliased(mut self, qualify: bool) -> Self {
        self.qualify_unaliased = qualify;
        self
    }

    /// Resolves a `Foreign` relation declared on `property` of `E` against a
    /// source record.
    ///
    /// Literals are read off `record`; the parent's alias never appears in
    /// the result.
    pub fn resolve_foreign<E: Entity>(
        &self,
        record: &E,
        property: &str,
        target_alias: Option<&str>,
    ) -> TableMapResult<Expression> {
        let source = self.registry.metadata::<E>()?;
        let link = expect_kind(&source, property, RelationKind::Foreign)?;
        let target = self.target_metadata(&source, property, link)?;
        let builder = target.where_builder(self.alias_for(&target, target_alias));

        tracing::trace!(
            entity = source.entity_name(),
            property,
            target = target.entity_name(),
            alias = builder.alias(),
            "resolving foreign relation"
        );

        match link.shape() {
            RelationShape::KeyEquality {
                source_field,
                target_field,
            } => {
                let value = record.field_value(source_field).ok_or_else(|| {
                    TableMapError::malformed_relation(
                        source.entity_name(),
                        property,
                        format!("source record has no value for '{source_field}'"),
                    )
                })?;
                builder.eq(target_field.as_str(), value)
            }
            RelationShape::Custom(f) => f(&builder, &RelationContext::record_of(record)),
        }
    }

    /// Resolves a `Join` relation declared on `property` of `E` against the
    /// parent's own builder.
    ///
    /// The result compares columns only and carries no bound values unless a
    /// custom shape adds some.
    pub fn resolve_join<E: Entity>(
        &self,
        parent: &WhereExpressionBuilder<'_>,
        property: &str,
        target_alias: Option<&str>,
    ) -> TableMapResult<Expression> {
        let source = self.registry.metadata::<E>()?;
        let link = expect_kind(&source, property, RelationKind::Join)?;
        let target = self.target_metadata(&source, property, link)?;
        let builder = target.where_builder(self.alias_for(&target, target_alias));

        tracing::trace!(
            entity = source.entity_name(),
            property,
            target = target.entity_name(),
            parent_alias = parent.alias(),
            alias = builder.alias(),
            "resolving join relation"
        );

        match link.shape() {
            RelationShape::KeyEquality {
                source_field,
                target_field,
            } => JoinExpressionBuilder::new(*parent.base(), *builder.base())
                .on(source_field.as_str(), target_field.as_str()),
            RelationShape::Custom(f) => f(&builder, &RelationContext::Parent(parent)),
        }
    }

    fn target_metadata(
        &self,
        source: &EntityMetadata,
        property: &str,
        link: &RelationLink,
    ) -> TableMapResult<std::sync::Arc<EntityMetadata>> {
        self.registry.metadata_by_key(link.target()).map_err(|_| {
            TableMapError::malformed_relation(
                source.entity_name(),
                property,
                format!("target entity '{}' is not registered", link.target()),
            )
        })
    }

    fn alias_for<'m>(&self, target: &'m EntityMetadata, alias: Option<&'m str>) -> Option<&'m str> {
        match alias {
            Some(alias) => Some(alias),
            None if self.qualify_unaliased => Some(target.table_name()),
            None => None,
        }
    }
}

fn expect_kind<'m>(
    source: &'m EntityMetadata,
    property: &str,
    kind: RelationKind,
) -> TableMapResult<&'m RelationLink> {
    let link = source
        .relation(property)
        .ok_or_else(|| TableMapError::unresolved(source.entity_name(), property))?;
    if link.kind() != kind {
        return Err(TableMapError::malformed_relation(
            source.entity_name(),
            property,
            format!("declared as {:?}, resolved as {kind:?}", link.kind()),
        ));
    }
    Ok(link)
}
