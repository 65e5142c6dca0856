//! Field mappings and field sets.
//!
//! This module provides [`FieldMapping`], which links a declared property to a
//! physical column, and [`FieldSet`], the per-entity collection that every
//! expression builder resolves properties against.

pub mod set;
pub mod types;

pub use set::FieldSet;
pub use types::{DataType, FieldMapping};
