//! Error types for SQLite operations.

use std::fmt;

use tally_migrate::{DatabaseError, DatabaseErrorKind};

/// Result type for SQLite operations.
pub type SqliteResult<T> = Result<T, SqliteError>;

/// Error type for SQLite operations.
#[derive(Debug)]
pub enum SqliteError {
    /// SQLite driver error.
    Sqlite(tokio_rusqlite::Error),
    /// Configuration error.
    Config(String),
    /// Connection error.
    Connection(String),
}

impl SqliteError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Underlying rusqlite error, if any.
    pub fn as_rusqlite(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::Sqlite(tokio_rusqlite::Error::Rusqlite(e)) => Some(e),
            _ => None,
        }
    }

    /// Check if this is a unique constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.as_rusqlite(),
            Some(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }

    /// Message without the variant prefix.
    ///
    /// Driver errors yield SQLite's own text (e.g. `no such table: users`),
    /// which is what ends up in the ledger's `error` column.
    pub fn message(&self) -> String {
        match self {
            Self::Sqlite(tokio_rusqlite::Error::Rusqlite(e)) => e.to_string(),
            Self::Sqlite(e) => e.to_string(),
            Self::Config(msg) | Self::Connection(msg) => msg.clone(),
        }
    }
}

impl fmt::Display for SqliteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(e) => write!(f, "SQLite error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Connection(msg) => write!(f, "Connection error: {}", msg),
        }
    }
}

impl std::error::Error for SqliteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sqlite(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tokio_rusqlite::Error> for SqliteError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}

impl From<rusqlite::Error> for SqliteError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(tokio_rusqlite::Error::Rusqlite(err))
    }
}

impl From<SqliteError> for DatabaseError {
    fn from(err: SqliteError) -> Self {
        let kind = match &err {
            _ if err.is_unique_violation() => DatabaseErrorKind::UniqueViolation,
            SqliteError::Sqlite(tokio_rusqlite::Error::ConnectionClosed) => {
                DatabaseErrorKind::Connection
            }
            SqliteError::Sqlite(_) => DatabaseErrorKind::Query,
            SqliteError::Config(_) | SqliteError::Connection(_) => DatabaseErrorKind::Connection,
        };
        DatabaseError::new(kind, err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SqliteError::config("invalid path");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("invalid path"));
    }

    #[test]
    fn test_error_conversion() {
        let err: DatabaseError = SqliteError::connection("unable to open database file").into();
        assert_eq!(err.kind, DatabaseErrorKind::Connection);
        assert_eq!(err.to_string(), "unable to open database file");
    }

    #[test]
    fn test_unique_violation_detection() {
        let failure = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE),
            Some("UNIQUE constraint failed: __migrations.name".into()),
        );
        let err = SqliteError::from(failure);
        assert!(err.is_unique_violation());

        let converted: DatabaseError = err.into();
        assert!(converted.is_unique_violation());
        assert!(!SqliteError::config("x").is_unique_violation());
    }
}
