//! Declarative configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries the
//! database connection settings and the list of mapped entities. Every
//! section defaults sensibly so a completely empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub mapping: MappingConfig,
}

impl Config {
    /// Deserialize and validate a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| Error::config(format!("parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(Error::config("database.pool_size must be at least 1"));
        }
        if self.database.connection_timeout_secs == 0 {
            return Err(Error::config(
                "database.connection_timeout_secs must be at least 1",
            ));
        }
        self.database.location()?;
        if self.mapping.entities.is_empty() {
            return Err(Error::config("mapping.entities must name at least one entity"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// Connection and schema settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection string: `sqlite::memory:`, `sqlite:mem:<name>`, or `sqlite:<path>`.
    pub url: String,

    /// Accepted for parity with server databases; SQLite ignores it.
    pub username: String,

    /// Accepted for parity with server databases; SQLite ignores it.
    pub password: String,

    pub dialect: Dialect,

    /// What the session factory does to the schema on build and close.
    pub schema_generation: SchemaGeneration,

    /// Log every executed SQL statement.
    pub show_sql: bool,

    pub pool_size: u32,

    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:mem:bookstore".to_string(),
            username: "sa".to_string(),
            password: String::new(),
            dialect: Dialect::default(),
            schema_generation: SchemaGeneration::default(),
            show_sql: true,
            pool_size: 4,
            connection_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    /// Resolve the connection string into a concrete database location.
    pub fn location(&self) -> Result<DatabaseLocation> {
        let rest = self.url.strip_prefix("sqlite:").ok_or_else(|| {
            Error::config(format!(
                "unsupported database url '{}': expected a sqlite: url",
                self.url
            ))
        })?;

        if rest == ":memory:" {
            return Ok(DatabaseLocation::Memory {
                name: "memdb".to_string(),
            });
        }

        if let Some(name) = rest.strip_prefix("mem:") {
            if name.is_empty() {
                return Err(Error::config("in-memory database url needs a name"));
            }
            return Ok(DatabaseLocation::Memory {
                name: name.to_string(),
            });
        }

        let path = rest.strip_prefix("//").unwrap_or(rest);
        if path.is_empty() {
            return Err(Error::config(format!(
                "database url '{}' has no path",
                self.url
            )));
        }
        Ok(DatabaseLocation::File(PathBuf::from(path)))
    }
}

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// An in-memory database, discarded when its last connection closes.
    Memory { name: String },
    /// A database file on disk.
    File(PathBuf),
}

impl DatabaseLocation {
    pub fn is_memory(&self) -> bool {
        matches!(self, DatabaseLocation::Memory { .. })
    }
}

/// SQL dialect spoken by the configured database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sqlite,
}

/// Schema-generation policy applied by the session factory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaGeneration {
    /// Leave the schema alone.
    None,
    /// Fail if a mapped table is missing.
    Validate,
    /// Create mapped tables that do not exist yet.
    Update,
    /// Drop and recreate mapped tables on build.
    Create,
    /// Drop and recreate on build, drop again on close.
    #[default]
    CreateDrop,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Entity types the session factory maps to tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub entities: Vec<String>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            entities: vec!["Book".to_string(), "Publisher".to_string()],
        }
    }
}
