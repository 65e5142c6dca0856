//! Settings for tablemap.
//!
//! This module provides the [`Settings`] struct, which holds all configuration,
//! and [`LazySettings`], a globally-accessible, lazily-initialized settings
//! instance. Settings are normally loaded once at startup via
//! [`settings_loader`](crate::settings_loader).

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// The complete configuration.
///
/// All fields have defaults, so a partial TOML or JSON document only needs to
/// specify the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enables human-readable log output.
    pub debug: bool,
    /// The tracing filter directive (e.g. "info", "tablemap_db=debug").
    pub log_level: String,
    /// Qualify unaliased relation targets with their table name.
    ///
    /// When `false`, a relation resolved without an explicit target alias
    /// produces bare column names.
    pub qualify_unaliased_relations: bool,
    /// Arbitrary user-defined settings.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            qualify_unaliased_relations: true,
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup. Until then,
/// [`get_or_default`](LazySettings::get_or_default) hands out the defaults.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings.
    ///
    /// Returns the rejected settings back if they were already configured.
    pub fn configure(&self, settings: Settings) -> Result<(), Settings> {
        self.inner.set(settings)
    }

    /// Returns the configured settings, if any.
    pub fn get(&self) -> Option<&Settings> {
        self.inner.get()
    }

    /// Returns the configured settings, or the defaults if none were set.
    ///
    /// Never fills the slot, so a later [`configure`](LazySettings::configure)
    /// still takes effect.
    pub fn get_or_default(&self) -> &Settings {
        self.inner
            .get()
            .unwrap_or_else(|| DEFAULT_SETTINGS.get_or_init(Settings::default))
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

static DEFAULT_SETTINGS: OnceLock<Settings> = OnceLock::new();

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
