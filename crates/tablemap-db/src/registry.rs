//! The entity metadata registry.
//!
//! Entity types record their table, columns, primary key markers, and
//! relations here once, during a single-threaded declaration phase at
//! startup. After that the registry is read concurrently by every query
//! construction; readers receive `Arc<EntityMetadata>` snapshots and never
//! observe a half-applied write.
//!
//! Two declaration surfaces are provided:
//!
//! - the four raw operations ([`register_table`](EntityRegistry::register_table),
//!   [`register_column`](EntityRegistry::register_column),
//!   [`register_id`](EntityRegistry::register_id),
//!   [`register_relation`](EntityRegistry::register_relation)), each applied
//!   immediately;
//! - [`EntityDeclaration`], which collects the same operations and commits
//!   them all-or-nothing.
//!
//! Runtime re-registration after startup must be externally serialized; the
//! registry does not order concurrent writers.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use tablemap_core::logging::declaration_span;
use tablemap_core::{TableMapError, TableMapResult};

use crate::fields::{DataType, FieldMapping};
use crate::model::{Entity, EntityKey, EntityMetadata};
use crate::query::expressions::Expression;
use crate::query::lookups::WhereExpressionBuilder;
use crate::relations::{RelationContext, RelationKind, RelationLink, RelationShape};

#[derive(Default)]
struct Inner {
    entities: HashMap<EntityKey, Arc<EntityMetadata>>,
    names: HashMap<&'static str, EntityKey>,
}

/// A directory of entity metadata keyed by entity type.
#[derive(Default)]
pub struct EntityRegistry {
    inner: RwLock<Inner>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Declaration ──────────────────────────────────────────────────

    /// Sets the table name of `E`, defaulting to `E::entity_name()`.
    ///
    /// Re-registration overwrites the previous name.
    pub fn register_table<E: Entity>(&self, name: Option<&str>) {
        let table = name.map_or_else(|| E::entity_name().to_string(), str::to_string);
        self.modify(EntityKey::of::<E>(), |meta| apply_table(meta, table));
    }

    /// Adds a column mapping for `property`, named `col_name` or `property`.
    ///
    /// Fails if `property` is already registered on `E`.
    pub fn register_column<E: Entity>(
        &self,
        property: &str,
        col_name: Option<&str>,
        data_type: DataType,
    ) -> TableMapResult<()> {
        let mapping = column_mapping(property, col_name, data_type);
        self.try_modify(EntityKey::of::<E>(), |meta| apply_column(meta, mapping))
    }

    /// Marks `property` as a primary key.
    ///
    /// The column must already be registered. An unknown property is logged
    /// and otherwise ignored, and several primary keys may be marked.
    pub fn register_id<E: Entity>(&self, property: &str) {
        self.modify(EntityKey::of::<E>(), |meta| apply_id(meta, property));
    }

    /// Records a relation from `property` on `E` to entity type `T`.
    ///
    /// A later registration for the same property replaces the earlier one.
    pub fn register_relation<E: Entity, T: Entity>(
        &self,
        property: &str,
        kind: RelationKind,
        shape: RelationShape,
    ) {
        let link = RelationLink::new::<T>(kind, shape);
        self.modify(EntityKey::of::<E>(), |meta| {
            apply_relation(meta, property.to_string(), link);
        });
    }

    // ── Lookup ───────────────────────────────────────────────────────

    /// Returns the metadata for entity type `E`.
    pub fn metadata<E: Entity>(&self) -> TableMapResult<Arc<EntityMetadata>> {
        self.metadata_by_key(EntityKey::of::<E>())
    }

    /// Returns the metadata for an entity key.
    pub fn metadata_by_key(&self, key: EntityKey) -> TableMapResult<Arc<EntityMetadata>> {
        self.read()
            .entities
            .get(&key)
            .cloned()
            .ok_or_else(|| TableMapError::UnregisteredEntity(key.name().to_string()))
    }

    /// Returns the metadata for an entity name.
    pub fn metadata_by_name(&self, name: &str) -> TableMapResult<Arc<EntityMetadata>> {
        let inner = self.read();
        inner
            .names
            .get(name)
            .and_then(|key| inner.entities.get(key))
            .cloned()
            .ok_or_else(|| TableMapError::UnregisteredEntity(name.to_string()))
    }

    /// Returns `true` if anything has been registered for `E`.
    pub fn is_registered<E: Entity>(&self) -> bool {
        self.read().entities.contains_key(&EntityKey::of::<E>())
    }

    /// The keys of every registered entity.
    pub fn keys(&self) -> Vec<EntityKey> {
        self.read().entities.keys().copied().collect()
    }

    /// The number of registered entity types.
    pub fn len(&self) -> usize {
        self.read().entities.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.read().entities.is_empty()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a private copy of the current metadata for `key`, or a fresh one.
    fn draft(&self, key: EntityKey) -> EntityMetadata {
        self.read()
            .entities
            .get(&key)
            .map_or_else(|| EntityMetadata::new(key), |meta| (**meta).clone())
    }

    fn publish(&self, meta: EntityMetadata) {
        let key = meta.key();
        let mut inner = self.write();
        inner.names.insert(key.name(), key);
        inner.entities.insert(key, Arc::new(meta));
    }

    fn modify<F>(&self, key: EntityKey, f: F)
    where
        F: FnOnce(&mut EntityMetadata),
    {
        let mut meta = self.draft(key);
        f(&mut meta);
        self.publish(meta);
    }

    fn try_modify<F>(&self, key: EntityKey, f: F) -> TableMapResult<()>
    where
        F: FnOnce(&mut EntityMetadata) -> TableMapResult<()>,
    {
        let mut meta = self.draft(key);
        f(&mut meta)?;
        self.publish(meta);
        Ok(())
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.read();
        let mut names: Vec<&str> = inner.names.keys().copied().collect();
        names.sort_unstable();
        f.debug_struct("EntityRegistry").field("entities", &names).finish()
    }
}

/// The process-wide registry.
pub static REGISTRY: Lazy<EntityRegistry> = Lazy::new(EntityRegistry::new);

fn column_mapping(property: &str, col_name: Option<&str>, data_type: DataType) -> FieldMapping {
    let mapping = FieldMapping::new(property, data_type);
    match col_name {
        Some(col) => mapping.column(col),
        None => mapping,
    }
}

/// Whether registering `table` replaces a different, previously registered name.
fn overwrites_table(meta: &EntityMetadata, table: &str) -> bool {
    meta.has_declared_table() && meta.table_name() != table
}

fn apply_table(meta: &mut EntityMetadata, table: String) {
    if overwrites_table(meta, &table) {
        tracing::warn!(
            entity = meta.entity_name(),
            previous = meta.table_name(),
            table = %table,
            "table name overwritten"
        );
    }
    tracing::debug!(entity = meta.entity_name(), table = %table, "registered table");
    meta.set_table_name(table);
}

fn apply_column(meta: &mut EntityMetadata, mapping: FieldMapping) -> TableMapResult<()> {
    tracing::debug!(
        entity = meta.entity_name(),
        property = mapping.field_name(),
        column = mapping.col_name(),
        "registered column"
    );
    meta.fields_mut().insert(mapping)
}

fn apply_id(meta: &mut EntityMetadata, property: &str) {
    if meta.fields_mut().update(property, FieldMapping::primary_key) {
        tracing::debug!(entity = meta.entity_name(), property, "registered primary key");
    } else {
        tracing::warn!(
            entity = meta.entity_name(),
            property,
            "primary key marker for an unregistered column ignored"
        );
    }
}

fn apply_relation(meta: &mut EntityMetadata, property: String, link: RelationLink) {
    let target = link.target();
    if meta.relations_mut().insert(property.clone(), link).is_some() {
        tracing::warn!(
            entity = meta.entity_name(),
            property = %property,
            "relation replaced"
        );
    }
    tracing::debug!(
        entity = meta.entity_name(),
        property = %property,
        target = target.name(),
        "registered relation"
    );
}

enum Declared {
    Table(Option<String>),
    Column(FieldMapping),
    Id(String),
    Relation(String, RelationLink),
}

/// Collects the declaration of one entity type and commits it in one step.
///
/// Operations are applied in the order they were added. If any of them fails,
/// nothing is written to the registry.
///
/// # Examples
///
/// ```
/// use tablemap_db::fields::DataType;
/// use tablemap_db::model::Entity;
/// use tablemap_db::registry::{EntityDeclaration, EntityRegistry};
/// use tablemap_db::value::Value;
///
/// struct Department { id: i64 }
///
/// impl Entity for Department {
///     fn entity_name() -> &'static str { "Department" }
///     fn field_values(&self) -> Vec<(&'static str, Value)> { vec![("id", Value::Int(self.id))] }
/// }
///
/// let registry = EntityRegistry::new();
/// EntityDeclaration::<Department>::new()
///     .table("department")
///     .column("id", DataType::Integer)
///     .id("id")
///     .commit(&registry)
///     .unwrap();
///
/// let meta = registry.metadata::<Department>().unwrap();
/// assert_eq!(meta.table_name(), "department");
/// assert_eq!(meta.fields().primary_keys().len(), 1);
/// ```
pub struct EntityDeclaration<E: Entity> {
    ops: Vec<Declared>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for EntityDeclaration<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityDeclaration<E> {
    /// Starts an empty declaration.
    pub const fn new() -> Self {
        Self {
            ops: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Sets the table name.
    #[must_use]
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.ops.push(Declared::Table(Some(name.into())));
        self
    }

    /// Uses the entity type's own name as the table name.
    #[must_use]
    pub fn default_table(mut self) -> Self {
        self.ops.push(Declared::Table(None));
        self
    }

    /// Declares a column named after the property.
    #[must_use]
    pub fn column(self, property: &str, data_type: DataType) -> Self {
        self.mapping(FieldMapping::new(property, data_type))
    }

    /// Declares a column with an explicit column name.
    #[must_use]
    pub fn column_as(self, property: &str, col_name: &str, data_type: DataType) -> Self {
        self.mapping(FieldMapping::new(property, data_type).column(col_name))
    }

    /// Declares a column from a complete mapping.
    #[must_use]
    pub fn mapping(mut self, mapping: FieldMapping) -> Self {
        self.ops.push(Declared::Column(mapping));
        self
    }

    /// Marks a previously declared column as a primary key.
    #[must_use]
    pub fn id(mut self, property: &str) -> Self {
        self.ops.push(Declared::Id(property.to_string()));
        self
    }

    /// Declares a relation with an explicit kind and shape.
    #[must_use]
    pub fn relation<T: Entity>(mut self, property: &str, kind: RelationKind, shape: RelationShape) -> Self {
        self.ops.push(Declared::Relation(
            property.to_string(),
            RelationLink::new::<T>(kind, shape),
        ));
        self
    }

    /// Foreign link: `target.target_field = record.source_field`.
    #[must_use]
    pub fn foreign<T: Entity>(self, property: &str, source_field: &str, target_field: &str) -> Self {
        self.relation::<T>(
            property,
            RelationKind::Foreign,
            RelationShape::key_equality(source_field, target_field),
        )
    }

    /// Foreign link built by a callback over the typed source record.
    #[must_use]
    pub fn foreign_with<T, F>(self, property: &str, f: F) -> Self
    where
        T: Entity,
        F: Fn(&WhereExpressionBuilder<'_>, &E) -> TableMapResult<Expression> + Send + Sync + 'static,
    {
        let entity = E::entity_name();
        let prop = property.to_string();
        let shape = RelationShape::custom(
            move |target: &WhereExpressionBuilder<'_>, ctx: &RelationContext<'_>| {
                let record = ctx.record::<E>().ok_or_else(|| {
                    TableMapError::malformed_relation(entity, prop.as_str(), "expected a source record")
                })?;
                f(target, record)
            },
        );
        self.relation::<T>(property, RelationKind::Foreign, shape)
    }

    /// Join link: `target.target_field = parent.source_field`.
    #[must_use]
    pub fn join<T: Entity>(self, property: &str, source_field: &str, target_field: &str) -> Self {
        self.relation::<T>(
            property,
            RelationKind::Join,
            RelationShape::key_equality(source_field, target_field),
        )
    }

    /// Join link built by a callback over `(target, parent)` builders.
    #[must_use]
    pub fn join_with<T, F>(self, property: &str, f: F) -> Self
    where
        T: Entity,
        F: Fn(&WhereExpressionBuilder<'_>, &WhereExpressionBuilder<'_>) -> TableMapResult<Expression>
            + Send
            + Sync
            + 'static,
    {
        let entity = E::entity_name();
        let prop = property.to_string();
        let shape = RelationShape::custom(
            move |target: &WhereExpressionBuilder<'_>, ctx: &RelationContext<'_>| {
                let parent = ctx.parent().ok_or_else(|| {
                    TableMapError::malformed_relation(entity, prop.as_str(), "expected a parent builder")
                })?;
                f(target, parent)
            },
        );
        self.relation::<T>(property, RelationKind::Join, shape)
    }

    /// Applies every collected operation to `registry`.
    ///
    /// Fails without modifying the registry if a column is declared twice.
    pub fn commit(self, registry: &EntityRegistry) -> TableMapResult<()> {
        let key = EntityKey::of::<E>();
        let span = declaration_span(key.name());
        let _guard = span.enter();

        let mut meta = registry.draft(key);
        for op in self.ops {
            match op {
                Declared::Table(name) => {
                    apply_table(&mut meta, name.unwrap_or_else(|| key.name().to_string()));
                }
                Declared::Column(mapping) => apply_column(&mut meta, mapping)?,
                Declared::Id(property) => apply_id(&mut meta, &property),
                Declared::Relation(property, link) => apply_relation(&mut meta, property, link),
            }
        }
        registry.publish(meta);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    struct Employee;

    impl Entity for Employee {
        fn entity_name() -> &'static str {
            "Employee"
        }

        fn field_values(&self) -> Vec<(&'static str, Value)> {
            Vec::new()
        }
    }

    struct Department;

    impl Entity for Department {
        fn entity_name() -> &'static str {
            "Department"
        }

        fn field_values(&self) -> Vec<(&'static str, Value)> {
            Vec::new()
        }
    }

    #[test]
    fn test_register_table_defaults_to_entity_name() {
        let registry = EntityRegistry::new();
        registry.register_table::<Employee>(None);
        assert_eq!(registry.metadata::<Employee>().unwrap().table_name(), "Employee");
    }

    #[test]
    fn test_register_table_last_write_wins() {
        let registry = EntityRegistry::new();
        registry.register_table::<Employee>(Some("staff"));
        registry.register_table::<Employee>(Some("employee"));
        assert_eq!(registry.metadata::<Employee>().unwrap().table_name(), "employee");
    }

    #[test]
    fn test_table_overwrite_detected_after_entity_named_table() {
        let registry = EntityRegistry::new();
        registry.register_table::<Employee>(Some("Employee"));
        let meta = registry.metadata::<Employee>().unwrap();
        assert!(meta.has_declared_table());
        assert!(overwrites_table(&meta, "staff"));
        assert!(!overwrites_table(&meta, "Employee"));

        registry.register_table::<Employee>(Some("staff"));
        assert_eq!(registry.metadata::<Employee>().unwrap().table_name(), "staff");
    }

    #[test]
    fn test_first_table_registration_is_not_an_overwrite() {
        let registry = EntityRegistry::new();
        registry
            .register_column::<Employee>("id", None, DataType::Integer)
            .unwrap();
        let meta = registry.metadata::<Employee>().unwrap();
        assert!(!meta.has_declared_table());
        assert!(!overwrites_table(&meta, "staff"));
    }

    #[test]
    fn test_register_column_duplicate_fails() {
        let registry = EntityRegistry::new();
        registry
            .register_column::<Employee>("firstName", Some("first_name"), DataType::Text)
            .unwrap();
        let err = registry
            .register_column::<Employee>("firstName", Some("given_name"), DataType::Text)
            .unwrap_err();
        assert!(err.is_declaration_error());

        // The first registration is not replaced
        let meta = registry.metadata::<Employee>().unwrap();
        assert_eq!(meta.fields().get("firstName").unwrap().col_name(), "first_name");
    }

    #[test]
    fn test_register_column_distinct_properties() {
        let registry = EntityRegistry::new();
        registry
            .register_column::<Employee>("id", None, DataType::Integer)
            .unwrap();
        registry
            .register_column::<Employee>("departmentId", Some("department_id"), DataType::Integer)
            .unwrap();
        let meta = registry.metadata::<Employee>().unwrap();
        assert_eq!(meta.fields().get("id").unwrap().col_name(), "id");
        assert_eq!(
            meta.fields().get("departmentId").unwrap().col_name(),
            "department_id"
        );
    }

    #[test]
    fn test_register_id_is_permissive() {
        let registry = EntityRegistry::new();
        registry.register_id::<Employee>("id");
        registry
            .register_column::<Employee>("id", None, DataType::Integer)
            .unwrap();
        // The early marker was dropped
        assert!(registry
            .metadata::<Employee>()
            .unwrap()
            .fields()
            .primary_keys()
            .is_empty());

        registry
            .register_column::<Employee>("badge", None, DataType::Text)
            .unwrap();
        registry.register_id::<Employee>("id");
        registry.register_id::<Employee>("badge");
        assert_eq!(
            registry.metadata::<Employee>().unwrap().fields().primary_keys().len(),
            2
        );
    }

    #[test]
    fn test_register_relation_replaces() {
        let registry = EntityRegistry::new();
        registry.register_relation::<Employee, Department>(
            "department",
            RelationKind::Foreign,
            RelationShape::key_equality("departmentId", "id"),
        );
        registry.register_relation::<Employee, Department>(
            "department",
            RelationKind::Join,
            RelationShape::key_equality("departmentId", "id"),
        );
        let meta = registry.metadata::<Employee>().unwrap();
        let link = meta.relation("department").unwrap();
        assert_eq!(link.kind(), RelationKind::Join);
        assert_eq!(link.target(), EntityKey::of::<Department>());
        assert_eq!(meta.relations().len(), 1);
    }

    #[test]
    fn test_unregistered_lookup() {
        let registry = EntityRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.metadata::<Department>().unwrap_err().code(),
            "unregistered_entity"
        );
        assert!(registry.metadata_by_name("Department").is_err());
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = EntityRegistry::new();
        registry.register_table::<Department>(Some("department"));
        assert!(registry.is_registered::<Department>());
        assert!(!registry.is_registered::<Employee>());
        assert_eq!(
            registry.metadata_by_name("Department").unwrap().table_name(),
            "department"
        );
        assert_eq!(registry.keys(), vec![EntityKey::of::<Department>()]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_snapshots_are_stable() {
        let registry = EntityRegistry::new();
        registry.register_table::<Employee>(Some("employee"));
        let before = registry.metadata::<Employee>().unwrap();
        registry
            .register_column::<Employee>("id", None, DataType::Integer)
            .unwrap();
        assert!(before.fields().is_empty());
        assert_eq!(registry.metadata::<Employee>().unwrap().fields().len(), 1);
    }

    #[test]
    fn test_declaration_commit() {
        let registry = EntityRegistry::new();
        EntityDeclaration::<Employee>::new()
            .table("employee")
            .column("id", DataType::Integer)
            .id("id")
            .column_as("departmentId", "department_id", DataType::Integer)
            .foreign::<Department>("department", "departmentId", "id")
            .commit(&registry)
            .unwrap();

        let meta = registry.metadata::<Employee>().unwrap();
        assert_eq!(meta.table_name(), "employee");
        assert_eq!(meta.fields().len(), 2);
        assert!(meta.fields().get("id").unwrap().is_primary_key());
        assert_eq!(meta.relation("department").unwrap().kind(), RelationKind::Foreign);
    }

    #[test]
    fn test_declaration_default_table() {
        let registry = EntityRegistry::new();
        EntityDeclaration::<Department>::new()
            .table("dept")
            .default_table()
            .commit(&registry)
            .unwrap();
        assert_eq!(registry.metadata::<Department>().unwrap().table_name(), "Department");
    }

    #[test]
    fn test_declaration_duplicate_is_rejected_atomically() {
        let registry = EntityRegistry::new();
        let result = EntityDeclaration::<Employee>::new()
            .table("employee")
            .column("id", DataType::Integer)
            .column_as("id", "employee_id", DataType::Integer)
            .commit(&registry);
        assert!(matches!(result, Err(TableMapError::DuplicateColumn { .. })));
        assert!(!registry.is_registered::<Employee>());
    }

    #[test]
    fn test_debug_lists_entities() {
        let registry = EntityRegistry::new();
        registry.register_table::<Employee>(None);
        registry.register_table::<Department>(None);
        assert_eq!(
            format!("{registry:?}"),
            r#"EntityRegistry { entities: ["Department", "Employee"] }"#
        );
    }
}
