//! TOML configuration for the catalog runner.
//!
//! ```toml
//! db_path = "employees.db"       # ":memory:" by default
//! enforce_foreign_keys = true
//! create_indexes = true
//! log_level = "info"             # RUST_LOG takes precedence
//! ```
//!
//! Missing keys take their defaults; command-line flags override the file.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sqlite::{SqliteConfig, IN_MEMORY};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Database file, or `:memory:`.
    pub db_path: String,
    /// Declare and enforce the `manager_id` foreign key.
    pub enforce_foreign_keys: bool,
    /// Install the catalog indexes. Results do not depend on them.
    pub create_indexes: bool,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: IN_MEMORY.to_string(),
            enforce_foreign_keys: true,
            create_indexes: true,
            log_level: "warn".to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading catalog config");
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn sqlite_config(&self) -> SqliteConfig {
        SqliteConfig::employees(self.db_path.clone())
            .with_foreign_keys(self.enforce_foreign_keys)
            .with_indexes(self.create_indexes)
    }
}
