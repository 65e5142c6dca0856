//! # tablemap
//!
//! Typed entity-to-table metadata and SQL expression builders.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient access.
//! You can depend on `tablemap` to get everything, or depend on the individual
//! crates for finer-grained control.
//!
//! ## Quick Start
//!
//! ```
//! use tablemap::prelude::*;
//!
//! struct Employee {
//!     id: i64,
//!     department_id: i64,
//! }
//!
//! impl Entity for Employee {
//!     fn entity_name() -> &'static str { "Employee" }
//!
//!     fn field_values(&self) -> Vec<(&'static str, Value)> {
//!         vec![("id", Value::Int(self.id)), ("departmentId", Value::Int(self.department_id))]
//!     }
//! }
//!
//! let registry = EntityRegistry::new();
//! EntityDeclaration::<Employee>::new()
//!     .table("employee")
//!     .column("id", DataType::Integer)
//!     .id("id")
//!     .column_as("departmentId", "department_id", DataType::Integer)
//!     .commit(&registry)
//!     .unwrap();
//!
//! let meta = registry.metadata::<Employee>().unwrap();
//! let predicate = meta.where_builder(Some("e")).eq("departmentId", 7_i64).unwrap();
//! assert_eq!(predicate.params(), vec![&Value::Int(7)]);
//! ```

/// Error types, settings, and logging.
pub use tablemap_core as core;

/// Entity metadata, the registry, and the expression builders.
pub use tablemap_db as db;

pub use tablemap_core::{Settings, TableMapError, TableMapResult, SETTINGS};

/// The most commonly used types in one import.
pub mod prelude {
    pub use tablemap_core::logging::setup_logging;
    pub use tablemap_core::{Settings, TableMapError, TableMapResult, SETTINGS};
    pub use tablemap_db::prelude::*;
}

// Re-export third-party crates for user convenience.
pub use serde;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;
