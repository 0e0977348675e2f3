//! Configuration for socketmap-sql
//!
//! Centralized configuration with sensible defaults, loadable from a TOML
//! file:
//!
//! ```toml
//! [database]
//! driver = "sqlite"
//! path = "/var/lib/mail/virtual.db"
//!
//! [misc]
//! recipient_delimiter = "+"
//! max_requests = 1000
//!
//! [tables.aliases]
//! query = "SELECT alias FROM aliases WHERE address = ?"
//!
//! [tables.domains]
//! query = "SELECT 'OK' FROM domains WHERE name = ?"
//! transform = "domain"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, SocketmapError};
use crate::query::MultiRowPolicy;
use crate::table::{TableDescriptor, TableRegistry};
use crate::transform::{TransformOptions, TransformRegistry};

/// Where the server looks for its config by default
pub const DEFAULT_CONFIG_PATH: &str = "/etc/socketmap-sql.toml";

/// Main configuration for a socketmap-sql process
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Database Configuration
    // -------------------------------------------------------------------------
    /// How to open the query handle
    pub database: DatabaseConfig,

    // -------------------------------------------------------------------------
    // Lookup Configuration
    // -------------------------------------------------------------------------
    /// Virtual tables by name
    pub tables: TableRegistry,

    /// Settings passed to every transform
    pub transform_options: TransformOptions,

    /// Row selection when a query returns several rows
    pub multi_row: MultiRowPolicy,

    // -------------------------------------------------------------------------
    // Session Configuration
    // -------------------------------------------------------------------------
    /// Exit after serving this many requests
    pub max_requests: Option<u64>,

    /// Exit when no input arrives for this long
    pub idle_timeout: Option<Duration>,
}

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Driver name; only `sqlite` is built in
    pub driver: String,

    /// Database file
    pub path: Option<PathBuf>,

    /// How long to wait on a locked database (milliseconds)
    pub busy_timeout_ms: u64,

    /// Open without write access
    pub read_only: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            path: None,
            busy_timeout_ms: 100,
            read_only: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            tables: TableRegistry::new(),
            transform_options: TransformOptions::default(),
            multi_row: MultiRowPolicy::FirstRow,
            max_requests: None,
            idle_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load a config file, resolving transform names against `transforms`
    pub fn load(path: impl AsRef<Path>, transforms: &TransformRegistry) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SocketmapError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents, transforms)
    }

    /// Parse config file contents
    pub fn from_toml_str(contents: &str, transforms: &TransformRegistry) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;

        let mut tables = TableRegistry::new();
        for (name, section) in file.tables {
            let Some(query) = section.query else {
                tracing::warn!("Skipping table {:?}: no query", name);
                continue;
            };
            let transform = transforms
                .resolve(section.transform.as_deref().unwrap_or("all"))
                .map_err(|e| SocketmapError::Config(format!("table {}: {}", name, e)))?;
            tables.insert(TableDescriptor::new(name, transform, query))?;
        }

        let multi_row = match file.misc.multi_row.as_str() {
            "first" => MultiRowPolicy::FirstRow,
            "join" => MultiRowPolicy::Join(file.misc.join_delimiter),
            other => {
                return Err(SocketmapError::Config(format!(
                    "misc.multi_row must be \"first\" or \"join\", got {:?}",
                    other
                )))
            }
        };

        Ok(Self {
            database: file.database,
            tables,
            transform_options: TransformOptions {
                recipient_delimiter: file.misc.recipient_delimiter.filter(|d| !d.is_empty()),
            },
            multi_row,
            max_requests: file.misc.max_requests,
            ..Self::default()
        })
    }
}

// =============================================================================
// File Format
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    database: DatabaseConfig,

    #[serde(default)]
    misc: MiscSection,

    #[serde(default)]
    tables: BTreeMap<String, TableSection>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MiscSection {
    recipient_delimiter: Option<String>,
    max_requests: Option<u64>,
    multi_row: String,
    join_delimiter: String,
}

impl Default for MiscSection {
    fn default() -> Self {
        Self {
            recipient_delimiter: None,
            max_requests: None,
            multi_row: "first".to_string(),
            join_delimiter: ",".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableSection {
    query: Option<String>,
    transform: Option<String>,
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the database settings
    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.config.database = database;
        self
    }

    /// Add a virtual table
    pub fn table(mut self, table: TableDescriptor) -> Result<Self> {
        self.config.tables.insert(table)?;
        Ok(self)
    }

    /// Set the recipient delimiter used by address transforms
    pub fn recipient_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.transform_options.recipient_delimiter = Some(delimiter.into());
        self
    }

    /// Set the multi-row policy
    pub fn multi_row(mut self, policy: MultiRowPolicy) -> Self {
        self.config.multi_row = policy;
        self
    }

    /// Set the request limit
    pub fn max_requests(mut self, max: u64) -> Self {
        self.config.max_requests = Some(max);
        self
    }

    /// Set the idle timeout; `None` waits forever
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
