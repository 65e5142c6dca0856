//! Entity types and their metadata.
//!
//! The [`Entity`] trait is implemented by every record type that maps to a
//! table. It supplies a stable name and the runtime field values that
//! foreign-key relations read from a source record.
//!
//! [`EntityMetadata`] is the per-type descriptor held by the
//! [`EntityRegistry`](crate::registry::EntityRegistry): table name, field
//! mappings, and declared relations. It is read-only once declared and is
//! shared between threads as an `Arc` snapshot.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use tablemap_core::{TableMapError, TableMapResult};

use crate::fields::{FieldMapping, FieldSet};
use crate::query::base::BaseExpressionBuilder;
use crate::query::lookups::WhereExpressionBuilder;
use crate::query::ordering::{GroupExpressionBuilder, OrderExpressionBuilder};
use crate::relations::RelationLink;
use crate::value::Value;

/// A record type whose fields map to table columns.
///
/// # Examples
///
/// ```
/// use tablemap_db::model::Entity;
/// use tablemap_db::value::Value;
///
/// struct Department {
///     id: i64,
///     name: String,
/// }
///
/// impl Entity for Department {
///     fn entity_name() -> &'static str { "department" }
///
///     fn field_values(&self) -> Vec<(&'static str, Value)> {
///         vec![("id", Value::Int(self.id)), ("name", Value::from(self.name.as_str()))]
///     }
/// }
///
/// let d = Department { id: 3, name: "R&D".into() };
/// assert_eq!(d.field_value("id"), Some(Value::Int(3)));
/// ```
pub trait Entity: Send + Sync + 'static {
    /// The type's own name; the default table name when none is declared.
    fn entity_name() -> &'static str
    where
        Self: Sized;

    /// Returns every property name with its current value.
    fn field_values(&self) -> Vec<(&'static str, Value)>;

    /// Returns the current value of one property.
    fn field_value(&self, name: &str) -> Option<Value> {
        self.field_values()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}

/// Anything that names a declared property.
///
/// Builders accept plain strings as well as typed [`Field`] tokens.
pub trait Property {
    /// The property identifier.
    fn property_name(&self) -> &str;
}

impl Property for str {
    fn property_name(&self) -> &str {
        self
    }
}

impl Property for String {
    fn property_name(&self) -> &str {
        self
    }
}

impl<T: Property + ?Sized> Property for &T {
    fn property_name(&self) -> &str {
        (**self).property_name()
    }
}

/// A typed token naming a property of entity `E`.
///
/// Declare these as associated constants so call sites refer to properties
/// by identifier instead of by string literal:
///
/// ```
/// use tablemap_db::model::{Field, Property};
///
/// struct Employee;
///
/// impl Employee {
///     const FIRST_NAME: Field<Employee> = Field::new("firstName");
/// }
///
/// assert_eq!(Employee::FIRST_NAME.property_name(), "firstName");
/// ```
///
/// The expression builders accept any [`Property`] and resolve it by name
/// only, so a `Field<Department>` handed to an `Employee` builder resolves
/// against whatever `Employee` property shares its name. Use
/// [`EntityMetadata::field`] when the token's entity must match.
pub struct Field<E> {
    name: &'static str,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Field<E> {
    /// Creates a token for the named property.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _entity: PhantomData,
        }
    }

    /// The property identifier.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<E> Clone for Field<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Field<E> {}

impl<E> fmt::Debug for Field<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

impl<E> Property for Field<E> {
    fn property_name(&self) -> &str {
        self.name
    }
}

/// The identity of an entity type in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    type_id: TypeId,
    name: &'static str,
}

impl EntityKey {
    /// Returns the key for entity type `E`.
    pub fn of<E: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            name: E::entity_name(),
        }
    }

    /// The entity type's own name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Table metadata for one entity type.
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    key: EntityKey,
    table_name: String,
    table_declared: bool,
    fields: FieldSet,
    relations: HashMap<String, RelationLink>,
}

impl EntityMetadata {
    pub(crate) fn new(key: EntityKey) -> Self {
        Self {
            key,
            table_name: key.name().to_string(),
            table_declared: false,
            fields: FieldSet::new(key.name()),
            relations: HashMap::new(),
        }
    }

    pub(crate) fn set_table_name(&mut self, name: String) {
        self.table_name = name;
        self.table_declared = true;
    }

    pub(crate) fn fields_mut(&mut self) -> &mut FieldSet {
        &mut self.fields
    }

    pub(crate) fn relations_mut(&mut self) -> &mut HashMap<String, RelationLink> {
        &mut self.relations
    }

    /// The registry key of the entity type.
    pub const fn key(&self) -> EntityKey {
        self.key
    }

    /// The entity type's own name.
    pub const fn entity_name(&self) -> &'static str {
        self.key.name()
    }

    /// The table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns `true` once a table name has been registered, even one equal
    /// to the entity name.
    pub const fn has_declared_table(&self) -> bool {
        self.table_declared
    }

    /// The field mappings.
    pub const fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Looks up the mapping named by a typed token, checking that the token
    /// belongs to this entity type.
    pub fn field<E: Entity>(&self, field: Field<E>) -> TableMapResult<&FieldMapping> {
        if EntityKey::of::<E>() != self.key {
            return Err(TableMapError::unresolved(
                self.entity_name(),
                format!("{}.{}", E::entity_name(), field.name()),
            ));
        }
        self.fields
            .get(field.name())
            .ok_or_else(|| TableMapError::unresolved(self.entity_name(), field.name()))
    }

    /// The relation declared on `property`, if any.
    pub fn relation(&self, property: &str) -> Option<&RelationLink> {
        self.relations.get(property)
    }

    /// All declared relations keyed by property name.
    pub const fn relations(&self) -> &HashMap<String, RelationLink> {
        &self.relations
    }

    /// A column resolver over this entity's fields.
    pub fn base_builder<'a>(&'a self, alias: Option<&'a str>) -> BaseExpressionBuilder<'a> {
        BaseExpressionBuilder::new(&self.fields, alias)
    }

    /// A predicate builder over this entity's fields.
    pub fn where_builder<'a>(&'a self, alias: Option<&'a str>) -> WhereExpressionBuilder<'a> {
        WhereExpressionBuilder::new(&self.fields, alias)
    }

    /// An ordering builder over this entity's fields.
    pub fn order_builder<'a>(&'a self, alias: Option<&'a str>) -> OrderExpressionBuilder<'a> {
        OrderExpressionBuilder::new(&self.fields, alias)
    }

    /// A grouping builder over this entity's fields.
    pub fn group_builder<'a>(&'a self, alias: Option<&'a str>) -> GroupExpressionBuilder<'a> {
        GroupExpressionBuilder::new(&self.fields, alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Employee {
        id: i64,
        department_id: Option<i64>,
    }

    impl Employee {
        const ID: Field<Self> = Field::new("id");
    }

    impl Entity for Employee {
        fn entity_name() -> &'static str {
            "employee"
        }

        fn field_values(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("id", Value::Int(self.id)),
                ("departmentId", Value::from(self.department_id)),
            ]
        }
    }

    struct Other;

    impl Entity for Other {
        fn entity_name() -> &'static str {
            "employee"
        }

        fn field_values(&self) -> Vec<(&'static str, Value)> {
            Vec::new()
        }
    }

    #[test]
    fn test_field_value_default_lookup() {
        let e = Employee {
            id: 1,
            department_id: None,
        };
        assert_eq!(e.field_value("id"), Some(Value::Int(1)));
        assert_eq!(e.field_value("departmentId"), Some(Value::Null));
        assert_eq!(e.field_value("salary"), None);
    }

    #[test]
    fn test_property_impls() {
        let owned = String::from("lastName");
        assert_eq!("firstName".property_name(), "firstName");
        assert_eq!(owned.property_name(), "lastName");
        assert_eq!((&owned).property_name(), "lastName");
        assert_eq!(Employee::ID.property_name(), "id");
        assert_eq!(Employee::ID.name(), "id");
    }

    #[test]
    fn test_entity_key_identity_is_by_type() {
        let a = EntityKey::of::<Employee>();
        let b = EntityKey::of::<Other>();
        assert_eq!(a.name(), b.name());
        assert_ne!(a, b);
        assert_eq!(a, EntityKey::of::<Employee>());
        assert_eq!(a.to_string(), "employee");
    }

    #[test]
    fn test_typed_field_lookup_checks_entity() {
        use crate::fields::DataType;

        const OTHER_ID: Field<Other> = Field::new("id");

        let mut meta = EntityMetadata::new(EntityKey::of::<Employee>());
        meta.fields_mut()
            .insert(FieldMapping::new("id", DataType::Integer))
            .unwrap();

        assert_eq!(meta.field(Employee::ID).unwrap().col_name(), "id");
        assert_eq!(meta.field(OTHER_ID).unwrap_err().code(), "unresolved_property");
        assert_eq!(
            meta.field(Field::<Employee>::new("salary")).unwrap_err().code(),
            "unresolved_property"
        );

        // Builders resolve by name alone
        assert!(meta.base_builder(None).resolve(OTHER_ID).is_ok());
    }

    #[test]
    fn test_new_metadata_defaults() {
        let meta = EntityMetadata::new(EntityKey::of::<Employee>());
        assert_eq!(meta.table_name(), "employee");
        assert_eq!(meta.entity_name(), "employee");
        assert!(!meta.has_declared_table());
        assert!(meta.fields().is_empty());
        assert!(meta.relations().is_empty());
        assert!(meta.relation("department").is_none());
    }
}
