//! CLI error types and result alias.

use miette::Diagnostic;
use thiserror::Error;

use tally_migrate::MigrationError;
use tally_sqlite::SqliteError;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(tally::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(tally::config))]
    Config(String),

    /// Reconciliation or ledger error
    #[error(transparent)]
    #[diagnostic(code(tally::migration))]
    Migration(#[from] MigrationError),

    /// Database error
    #[error("Database error: {0}")]
    #[diagnostic(code(tally::database))]
    Database(String),

    /// Command error
    #[error("{0}")]
    #[diagnostic(code(tally::command))]
    Command(String),
}

impl From<SqliteError> for CliError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Config(msg) => CliError::Config(msg),
            other => CliError::Database(other.message()),
        }
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}
