//! # tablemap-core
//!
//! Core types for tablemap: the error type, settings, and logging setup.
//! This crate has no framework dependencies and is the foundation for
//! `tablemap-db`.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Settings and the global configuration slot
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{TableMapError, TableMapResult};
pub use settings::{Settings, SETTINGS};
