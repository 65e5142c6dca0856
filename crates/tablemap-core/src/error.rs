//! Core error types for tablemap.
//!
//! This module provides the [`TableMapError`] enum covering declaration-time
//! failures (duplicate columns), query-construction failures (unresolved
//! properties, malformed relations), and configuration errors. Every failure
//! here reflects a programming or declaration mistake, so nothing is retried:
//! errors propagate to the caller as soon as they are detected.

use thiserror::Error;

/// The primary error type for tablemap.
///
/// Each variant maps to a stable short identifier via [`TableMapError::code`],
/// which callers can match on without parsing the display text.
#[derive(Error, Debug)]
pub enum TableMapError {
    // ── Query construction ───────────────────────────────────────────

    /// A builder was asked to resolve a property absent from its field set.
    #[error("Unresolved property '{property}' on entity '{entity}'")]
    UnresolvedProperty {
        /// The entity (or table) the lookup was performed against.
        entity: String,
        /// The property name that could not be found.
        property: String,
    },

    /// An expression could not be assembled from the given operands.
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    // ── Declaration ──────────────────────────────────────────────────

    /// The same property was registered twice as a column on one entity.
    #[error("Duplicate column declaration for property '{property}' on entity '{entity}'")]
    DuplicateColumn {
        /// The declaring entity.
        entity: String,
        /// The property that was registered twice.
        property: String,
    },

    /// A relation could not be resolved into a join predicate.
    #[error("Malformed relation '{property}' on entity '{entity}': {reason}")]
    MalformedRelation {
        /// The declaring entity.
        entity: String,
        /// The relation property.
        property: String,
        /// What was missing or inconsistent.
        reason: String,
    },

    /// No metadata has been registered for the requested entity type.
    #[error("Entity is not registered: {0}")]
    UnregisteredEntity(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TableMapError {
    /// Creates an [`UnresolvedProperty`](Self::UnresolvedProperty) error.
    pub fn unresolved(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnresolvedProperty {
            entity: entity.into(),
            property: property.into(),
        }
    }

    /// Creates a [`MalformedRelation`](Self::MalformedRelation) error.
    pub fn malformed_relation(
        entity: impl Into<String>,
        property: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRelation {
            entity: entity.into(),
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Returns a stable, machine-readable identifier for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnresolvedProperty { .. } => "unresolved_property",
            Self::InvalidExpression(_) => "invalid_expression",
            Self::DuplicateColumn { .. } => "duplicate_column",
            Self::MalformedRelation { .. } => "malformed_relation",
            Self::UnregisteredEntity(_) => "unregistered_entity",
            Self::ConfigurationError(_) => "configuration",
            Self::IoError(_) => "io",
        }
    }

    /// Returns `true` for errors raised while declaring entity metadata.
    pub const fn is_declaration_error(&self) -> bool {
        matches!(self, Self::DuplicateColumn { .. })
    }
}

/// A convenience type alias for `Result<T, TableMapError>`.
pub type TableMapResult<T> = Result<T, TableMapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TableMapError::unresolved("employee", "salary").code(),
            "unresolved_property"
        );
        assert_eq!(
            TableMapError::DuplicateColumn {
                entity: "employee".into(),
                property: "id".into(),
            }
            .code(),
            "duplicate_column"
        );
        assert_eq!(
            TableMapError::malformed_relation("employee", "department", "missing").code(),
            "malformed_relation"
        );
        assert_eq!(
            TableMapError::UnregisteredEntity("x".into()).code(),
            "unregistered_entity"
        );
        assert_eq!(TableMapError::InvalidExpression("x".into()).code(), "invalid_expression");
        assert_eq!(TableMapError::ConfigurationError("x".into()).code(), "configuration");
    }

    #[test]
    fn test_unresolved_display() {
        let err = TableMapError::unresolved("employee", "salary");
        assert_eq!(
            err.to_string(),
            "Unresolved property 'salary' on entity 'employee'"
        );
    }

    #[test]
    fn test_malformed_relation_display() {
        let err = TableMapError::malformed_relation("employee", "department", "target missing");
        assert!(err.to_string().contains("target missing"));
        assert!(err.to_string().contains("'department'"));
    }

    #[test]
    fn test_declaration_error_flag() {
        let dup = TableMapError::DuplicateColumn {
            entity: "e".into(),
            property: "p".into(),
        };
        assert!(dup.is_declaration_error());
        assert!(!TableMapError::unresolved("e", "p").is_declaration_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: TableMapError = io_err.into();
        assert_eq!(err.code(), "io");
        assert!(err.to_string().contains("file missing"));
    }
}
