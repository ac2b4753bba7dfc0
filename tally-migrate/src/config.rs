//! Engine configuration.

use std::path::PathBuf;

use crate::error::{MigrateResult, MigrationError};

/// Default name of the ledger table.
pub const DEFAULT_LEDGER_TABLE: &str = "__migrations";

/// Default migrations directory.
pub const DEFAULT_MIGRATIONS_DIR: &str = "./migrations";

/// Configuration for the migration engine.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Path to the migrations directory.
    pub migrations_dir: PathBuf,
    /// Name of the ledger table.
    pub table_name: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            table_name: DEFAULT_LEDGER_TABLE.to_string(),
        }
    }
}

impl MigrationConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the migrations directory.
    pub fn migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Set the ledger table name.
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Check that the configuration can be used.
    ///
    /// The table name ends up inside DDL, so it must be a plain identifier.
    pub fn validate(&self) -> MigrateResult<()> {
        if !is_plain_identifier(&self.table_name) {
            return Err(MigrationError::invalid_config(format!(
                "ledger table name '{}' must match [A-Za-z_][A-Za-z0-9_]*",
                self.table_name
            )));
        }
        Ok(())
    }
}

pub(crate) fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
