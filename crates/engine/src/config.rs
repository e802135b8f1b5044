//! Store configuration via `syncstore.toml`
//!
//! Configuration is owned by the embedding application; this module only
//! reads it. On first open a commented default file can be written next to
//! the data; to change settings, edit the file and reopen the store.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Config file name conventionally placed next to the database.
pub const CONFIG_FILE_NAME: &str = "syncstore.toml";

/// Errors loading or persisting the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access config file '{path}': {reason}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying I/O error text.
        reason: String,
    },
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config file '{path}': {reason}")]
    Parse {
        /// Offending path.
        path: String,
        /// Underlying parse error text.
        reason: String,
    },
}

/// Which relational backend the engine connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Embedded SQLite database (default).
    Sqlite,
    /// MySQL server (requires the `mysql` cargo feature).
    Mysql,
}

/// Connection and resilience settings, loaded from `syncstore.toml`.
///
/// # Example
///
/// ```toml
/// backend = "sqlite"
/// database = "records.db"
/// table_prefix = "sync"
/// retry_budget = 3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend kind: `"sqlite"` or `"mysql"`.
    #[serde(default = "default_backend")]
    pub backend: BackendKind,
    /// Server host (MySQL backend only).
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (MySQL backend only).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database name. The SQLite backend treats this as the database file
    /// path; `":memory:"` yields an ephemeral store.
    #[serde(default = "default_database")]
    pub database: String,
    /// User name (MySQL backend only).
    #[serde(default)]
    pub user: String,
    /// Password (MySQL backend only).
    #[serde(default)]
    pub password: String,
    /// Table-name prefix shared by every record table.
    #[serde(default = "default_prefix")]
    pub table_prefix: String,
    /// How many times a transiently failed query is retried.
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,
    /// Fixed sleep between transient retries, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Diagnostic override: uid to run under when a caller identity cannot
    /// be resolved. Absent in production configurations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_identity: Option<u64>,
}

fn default_backend() -> BackendKind {
    BackendKind::Sqlite
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_database() -> String {
    ":memory:".to_string()
}

fn default_prefix() -> String {
    "sync".to_string()
}

fn default_retry_budget() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    300
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            host: default_host(),
            port: default_port(),
            database: default_database(),
            user: String::new(),
            password: String::new(),
            table_prefix: default_prefix(),
            retry_budget: default_retry_budget(),
            retry_backoff_ms: default_retry_backoff_ms(),
            debug_identity: None,
        }
    }
}

impl StoreConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# syncstore configuration
#
# Backend: "sqlite" (embedded, default) or "mysql"
backend = "sqlite"

# Database name. For the sqlite backend this is the database file path;
# ":memory:" keeps everything in memory.
database = ":memory:"

# Server settings, used by the mysql backend only.
host = "localhost"
port = 3306
user = ""
password = ""

# Prefix shared by every record table (avoids name clashes in a shared
# database).
table_prefix = "sync"

# Transient-failure handling: how many retries per query, and the fixed
# sleep between them.
retry_budget = 3
retry_backoff_ms = 300

# Diagnostic fallback identity for scripts without a resolved user.
# debug_identity = 11
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
