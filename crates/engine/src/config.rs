//! Engine configuration via `sideinput.toml`
//!
//! A worker may ship a `sideinput.toml` next to its other settings. A
//! missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SideInputError};

/// Config file name looked up in the worker's config directory.
pub const CONFIG_FILE_NAME: &str = "sideinput.toml";

/// Side-input engine configuration.
///
/// # Example
///
/// ```toml
/// # Build iterators generically when no specialized constructor is registered
/// generic_fallback = true
///
/// # Close cursors of spawned iterators that are dropped while still open
/// close_spawned_on_drop = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fall back to the generic iterator when the registry has no entry.
    /// When `false`, unregistered iterator types are refused at construction.
    #[serde(default = "default_true")]
    pub generic_fallback: bool,
    /// Close the cursor of a spawned iterator dropped without `close`.
    #[serde(default = "default_true")]
    pub close_spawned_on_drop: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generic_fallback: true,
            close_spawned_on_drop: true,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SideInputError::Config(e.to_string()))
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| SideInputError::Config(e.to_string()))
    }

    /// Load `sideinput.toml` from `dir`, or defaults if the file is absent.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| {
            SideInputError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Side-input engine configuration
#
# Build iterators generically when no specialized constructor is registered
# (default: true). Set to false to require a registered constructor for
# every iterator type.
generic_fallback = true

# Close the cursor of a spawned iterator that is dropped while still open
# (default: true). Close failures are logged, not raised.
close_spawned_on_drop = true
"#
    }
}
