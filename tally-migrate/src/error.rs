//! Error types for the migration engine.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur during migration operations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The migrations path is missing or is not a directory.
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// The migrations directory could not be listed.
    #[error("Failed to read migrations directory {}: {source}", .path.display())]
    DirectoryUnreadable {
        /// Directory that was being listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A discovered migration has no readable body file.
    #[error("Failed to read migration file for migration {name}: {source}")]
    MigrationBodyUnreadable {
        /// Migration name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Two local directories map to the same migration name.
    #[error("Multiple migration directories resolve to the name '{0}'")]
    DuplicateMigrationName(String),

    /// The ledger references migrations that are absent locally.
    #[error(
        "Some migrations have been ran but are missing from the migrations folder:\n\n{}",
        .0.join("\n")
    )]
    MissingMigrationFiles(Vec<String>),

    /// Local migration content no longer matches the recorded fingerprint.
    #[error(
        "Some migrations have been modified since they were ran. Please fix them first.\n\n{}",
        .0.join("\n")
    )]
    FingerprintMismatch(Vec<String>),

    /// A ledger row already exists for this migration.
    #[error("Migration '{0}' already has a ledger entry")]
    DuplicateMigration(String),

    /// Forward progress is blocked by errored migrations.
    #[error(
        "Some migrations have errored and need to be fixed first:\n\n{}",
        .0.join("\n")
    )]
    Blocked(Vec<String>),

    /// Migration not found.
    #[error("Could not find migration with name {0}")]
    NotFound(String),

    /// A ledger row could not be interpreted.
    #[error("Invalid ledger row: {0}")]
    InvalidLedgerRow(String),

    /// Status override that the engine does not allow.
    #[error("Cannot mark migration '{name}' as {status}")]
    InvalidStatusOverride {
        /// Migration name.
        name: String,
        /// Requested status.
        status: String,
    },

    /// Invalid engine configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Database operation error.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrationError {
    /// Create an invalid ledger row error.
    pub fn invalid_row(msg: impl Into<String>) -> Self {
        Self::InvalidLedgerRow(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Check whether this error came out of reconciling local and remote state.
    ///
    /// These never leave the ledger modified.
    pub fn is_reconciliation_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingMigrationFiles(_) | Self::FingerprintMismatch(_)
        )
    }

    /// Migration names attached to this error, if it lists any.
    pub fn migration_names(&self) -> &[String] {
        match self {
            Self::MissingMigrationFiles(names)
            | Self::FingerprintMismatch(names)
            | Self::Blocked(names) => names,
            _ => &[],
        }
    }
}

/// Broad classification of a database failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseErrorKind {
    /// The connection could not be established or was lost.
    Connection,
    /// A uniqueness constraint was violated.
    UniqueViolation,
    /// The statement failed to execute.
    Query,
}

impl fmt::Display for DatabaseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "connection"),
            Self::UniqueViolation => write!(f, "unique violation"),
            Self::Query => write!(f, "query"),
        }
    }
}

/// Error reported by a [`Database`](crate::database::Database) implementation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DatabaseError {
    /// What went wrong.
    pub kind: DatabaseErrorKind,
    /// Driver message, shown verbatim to the operator.
    pub message: String,
}

impl DatabaseError {
    /// Create a new database error.
    pub fn new(kind: DatabaseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::new(DatabaseErrorKind::Query, message)
    }

    /// Check if this is a uniqueness violation.
    pub fn is_unique_violation(&self) -> bool {
        self.kind == DatabaseErrorKind::UniqueViolation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_lists_every_name() {
        let err = MigrationError::MissingMigrationFiles(vec!["1_a".into(), "2_b".into()]);
        let msg = err.to_string();
        assert!(msg.contains("missing from the migrations folder"));
        assert!(msg.contains("1_a\n2_b"));
        assert!(err.is_reconciliation_failure());
    }

    #[test]
    fn test_fingerprint_mismatch_display() {
        let err = MigrationError::FingerprintMismatch(vec!["1_a".into()]);
        assert!(err.to_string().contains("modified since they were ran"));
        assert_eq!(err.migration_names(), ["1_a".to_string()]);
    }

    #[test]
    fn test_database_error_is_transparent() {
        let err = MigrationError::from(DatabaseError::query("no such table: users"));
        assert_eq!(err.to_string(), "no such table: users");
        assert!(!err.is_reconciliation_failure());
    }

    #[test]
    fn test_unique_violation() {
        let violation =
            DatabaseError::new(DatabaseErrorKind::UniqueViolation, "UNIQUE constraint failed");
        assert!(violation.is_unique_violation());
        assert!(!DatabaseError::query("syntax error").is_unique_violation());
    }

    #[test]
    fn test_not_a_directory_display() {
        let err = MigrationError::NotADirectory(PathBuf::from("/tmp/nope"));
        assert_eq!(err.to_string(), "/tmp/nope is not a directory");
    }
}
