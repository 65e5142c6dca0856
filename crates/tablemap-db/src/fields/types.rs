//! Field mapping descriptors.
//!
//! A [`FieldMapping`] links one declared property of an entity type to one
//! physical column. [`DataType`] is the closed set of scalar kinds a column
//! can be declared with.

/// The scalar kind of a mapped column.
///
/// The kind is recorded for callers and the rendering engine; builders do not
/// check literal operands against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DataType {
    /// Boolean (true/false).
    Bool,
    /// Signed integer of any width.
    Integer,
    /// Floating-point number.
    Float,
    /// Fixed-precision decimal number.
    Decimal,
    /// Character data.
    Text,
    /// Raw binary data.
    Binary,
    /// Date without time.
    Date,
    /// Date and time without timezone.
    DateTime,
    /// Date and time with timezone.
    DateTimeTz,
    /// Time without date.
    Time,
    /// UUID.
    Uuid,
    /// JSON document.
    Json,
}

impl DataType {
    /// Returns the generic SQL type name for this kind.
    pub const fn sql_name(&self) -> &'static str {
        match self {
            Self::Bool => "BOOLEAN",
            Self::Integer => "BIGINT",
            Self::Float => "DOUBLE PRECISION",
            Self::Decimal => "NUMERIC",
            Self::Text => "TEXT",
            Self::Binary => "BLOB",
            Self::Date => "DATE",
            Self::DateTime => "TIMESTAMP",
            Self::DateTimeTz => "TIMESTAMP WITH TIME ZONE",
            Self::Time => "TIME",
            Self::Uuid => "UUID",
            Self::Json => "JSON",
        }
    }
}

/// Maps one declared property to one column.
///
/// Immutable after construction: the builder-style methods consume the
/// mapping and return a new one.
///
/// # Examples
///
/// ```
/// use tablemap_db::fields::{DataType, FieldMapping};
///
/// let mapping = FieldMapping::new("firstName", DataType::Text).column("first_name");
/// assert_eq!(mapping.field_name(), "firstName");
/// assert_eq!(mapping.col_name(), "first_name");
/// assert!(!mapping.is_primary_key());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldMapping {
    field_name: String,
    col_name: String,
    data_type: DataType,
    primary_key: bool,
}

impl FieldMapping {
    /// Creates a mapping whose column name equals the property name.
    pub fn new(field_name: impl Into<String>, data_type: DataType) -> Self {
        let field_name = field_name.into();
        Self {
            col_name: field_name.clone(),
            field_name,
            data_type,
            primary_key: false,
        }
    }

    /// Sets the physical column name.
    #[must_use]
    pub fn column(mut self, col_name: impl Into<String>) -> Self {
        self.col_name = col_name.into();
        self
    }

    /// Marks this mapping as (part of) the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// The property identifier on the owning entity type.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The physical column name.
    pub fn col_name(&self) -> &str {
        &self.col_name
    }

    /// The declared scalar kind.
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Whether this mapping is marked as a primary key.
    pub const fn is_primary_key(&self) -> bool {
        self.primary_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_defaults_to_field_name() {
        let m = FieldMapping::new("id", DataType::Integer);
        assert_eq!(m.col_name(), "id");
        assert_eq!(m.data_type(), DataType::Integer);
        assert!(!m.is_primary_key());
    }

    #[test]
    fn test_builder_methods() {
        let m = FieldMapping::new("departmentId", DataType::Integer)
            .column("department_id")
            .primary_key();
        assert_eq!(m.field_name(), "departmentId");
        assert_eq!(m.col_name(), "department_id");
        assert!(m.is_primary_key());
    }

    #[test]
    fn test_sql_names() {
        assert_eq!(DataType::Integer.sql_name(), "BIGINT");
        assert_eq!(DataType::Text.sql_name(), "TEXT");
        assert_eq!(DataType::DateTimeTz.sql_name(), "TIMESTAMP WITH TIME ZONE");
    }
}
