//! The queryable view over one entity's field mappings.

use std::collections::HashMap;

use tablemap_core::{TableMapError, TableMapResult};

use super::types::FieldMapping;

/// The field mappings of one entity type, in declaration order.
///
/// Lookups by property name are constant time. A `FieldSet` never holds two
/// mappings for the same property name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    entity: String,
    mappings: Vec<FieldMapping>,
    index: HashMap<String, usize>,
}

impl FieldSet {
    /// Creates an empty field set owned by `entity`.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            mappings: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builds a field set from mappings, rejecting duplicate property names.
    pub fn from_mappings(
        entity: impl Into<String>,
        mappings: impl IntoIterator<Item = FieldMapping>,
    ) -> TableMapResult<Self> {
        let mut set = Self::new(entity);
        for mapping in mappings {
            set.insert(mapping)?;
        }
        Ok(set)
    }

    pub(crate) fn insert(&mut self, mapping: FieldMapping) -> TableMapResult<()> {
        if self.index.contains_key(mapping.field_name()) {
            return Err(TableMapError::DuplicateColumn {
                entity: self.entity.clone(),
                property: mapping.field_name().to_string(),
            });
        }
        self.index
            .insert(mapping.field_name().to_string(), self.mappings.len());
        self.mappings.push(mapping);
        Ok(())
    }

    /// Applies `f` to the mapping for `name`. Returns `false` if it is absent.
    pub(crate) fn update<F>(&mut self, name: &str, f: F) -> bool
    where
        F: FnOnce(FieldMapping) -> FieldMapping,
    {
        let Some(&idx) = self.index.get(name) else {
            return false;
        };
        let current = self.mappings[idx].clone();
        self.mappings[idx] = f(current);
        true
    }

    /// The entity label used in error messages.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Returns the mapping for a property name.
    pub fn get(&self, name: &str) -> Option<&FieldMapping> {
        self.index.get(name).map(|&idx| &self.mappings[idx])
    }

    /// Returns `true` if a mapping exists for the property name.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the mappings whose property name is in `names`, in this set's order.
    ///
    /// Names with no mapping are skipped.
    pub fn filter_fields<S: AsRef<str>>(&self, names: &[S]) -> Vec<&FieldMapping> {
        self.mappings
            .iter()
            .filter(|m| names.iter().any(|n| n.as_ref() == m.field_name()))
            .collect()
    }

    /// Returns the mapping for each name in `names`, in the order of `names`.
    ///
    /// Names with no mapping are skipped.
    pub fn get_field_mappings_by_keys<S: AsRef<str>>(&self, names: &[S]) -> Vec<&FieldMapping> {
        names.iter().filter_map(|n| self.get(n.as_ref())).collect()
    }

    /// Returns every mapping marked as a primary key.
    ///
    /// More than one may be returned; multiple markers are recorded as declared.
    pub fn primary_keys(&self) -> Vec<&FieldMapping> {
        self.mappings.iter().filter(|m| m.is_primary_key()).collect()
    }

    /// Returns the physical column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.mappings.iter().map(FieldMapping::col_name).collect()
    }

    /// Iterates over the mappings in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldMapping> {
        self.mappings.iter()
    }

    /// The number of mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns `true` if no mappings have been declared.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a FieldMapping;
    type IntoIter = std::slice::Iter<'a, FieldMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
