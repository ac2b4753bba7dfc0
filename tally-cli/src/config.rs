//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tally_migrate::{DEFAULT_LEDGER_TABLE, DEFAULT_MIGRATIONS_DIR, MigrationConfig};

use crate::cli::GlobalArgs;
use crate::error::{CliError, CliResult};

/// Default config file name (lives in project root)
pub const CONFIG_FILE_NAME: &str = "tally.toml";

/// Tally CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Migration configuration
    pub migrations: MigrationsConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> CliResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command-line and environment overrides
    pub fn with_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(url) = &args.database_url {
            self.database.url = Some(url.clone());
        }
        if let Some(dir) = &args.migrations_dir {
            self.migrations.directory = dir.clone();
        }
        self
    }

    /// Database URL, which every command except `create` needs
    pub fn database_url(&self) -> CliResult<&str> {
        self.database.url.as_deref().ok_or_else(|| {
            CliError::Config(format!(
                "No database URL configured. Pass --database-url, set TALLY_DATABASE_URL \
                 or add `url` under [database] in {}",
                CONFIG_FILE_NAME
            ))
        })
    }

    /// Engine configuration derived from the `[migrations]` table
    pub fn migration_config(&self) -> MigrationConfig {
        MigrationConfig::new()
            .migrations_dir(&self.migrations.directory)
            .table_name(&self.migrations.table_name)
    }
}

/// Database configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: Option<String>,
}

/// Migration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationsConfig {
    /// Directory for migration files
    pub directory: PathBuf,

    /// Ledger table name
    pub table_name: String,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            table_name: DEFAULT_LEDGER_TABLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [database]
            url = "sqlite://./app.db"

            [migrations]
            directory = "db/migrations"
            table_name = "schema_history"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_url().unwrap(), "sqlite://./app.db");
        assert_eq!(config.migrations.directory, PathBuf::from("db/migrations"));
        assert_eq!(config.migration_config().table_name, "schema_history");
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();

        assert!(config.database_url().is_err());
        assert_eq!(config.migrations.directory, PathBuf::from("./migrations"));
        assert_eq!(config.migrations.table_name, "__migrations");
    }

    #[test]
    fn test_flags_override_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "[database]\nurl = \"sqlite://file.db\"\n[migrations]\ndirectory = \"from-file\"\n",
        )
        .unwrap();

        let args = GlobalArgs {
            database_url: Some("sqlite://flag.db".into()),
            migrations_dir: None,
            config: path.clone(),
        };
        let config = Config::load_or_default(&path).unwrap().with_overrides(&args);

        assert_eq!(config.database_url().unwrap(), "sqlite://flag.db");
        assert_eq!(config.migrations.directory, PathBuf::from("from-file"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[database\nurl = 1").unwrap();

        assert!(matches!(Config::load(&path), Err(CliError::Config(_))));
    }
}
