//! Cache facade configuration.
//!
//! Loadable from TOML; every field has a default, so an empty document is a
//! valid configuration:
//!
//! ```toml
//! enabled = true
//! cache_errors = true
//! coalesce_in_flight = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use bowlise_core::{Error, Result};

/// Cache facade configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When false the facade forwards every call to the backend and caches
    /// nothing.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Keep failed per-key fetches in the cache so repeated lookups return
    /// the same error without another backend call.
    #[serde(default = "default_true")]
    pub cache_errors: bool,

    /// Let concurrent misses for the same key share one backend fetch.
    #[serde(default)]
    pub coalesce_in_flight: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            cache_errors: default_true(),
            coalesce_in_flight: false,
        }
    }
}

impl CacheConfig {
    /// Configuration that turns the facade into a pass-through.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse cache config: {e}")))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded cache config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
