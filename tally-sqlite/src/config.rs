//! SQLite configuration.

use std::path::{Path, PathBuf};

use crate::error::{SqliteError, SqliteResult};

/// SQLite database configuration.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database path (or ":memory:" for in-memory).
    pub path: DatabasePath,
    /// Enable foreign keys.
    pub foreign_keys: bool,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: Option<u32>,
    /// Journal mode.
    pub journal_mode: JournalMode,
    /// Create the database file when it does not exist.
    pub create_if_missing: bool,
}

/// Database path configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabasePath {
    /// In-memory database.
    #[default]
    Memory,
    /// File-based database.
    File(PathBuf),
}

impl DatabasePath {
    /// Human-readable form, used in logs and error messages.
    pub fn display(&self) -> String {
        match self {
            Self::Memory => ":memory:".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// Check if this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

/// SQLite journal mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JournalMode {
    /// DELETE - Default mode, deletes journal after transaction.
    Delete,
    /// TRUNCATE - Truncates journal instead of deleting.
    Truncate,
    /// MEMORY - Keep journal in memory.
    Memory,
    /// WAL - Write-Ahead Logging.
    #[default]
    Wal,
}

impl JournalMode {
    /// Get the SQLite pragma value.
    pub fn as_pragma(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
        }
    }

    fn parse(value: &str) -> SqliteResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "delete" => Ok(Self::Delete),
            "truncate" => Ok(Self::Truncate),
            "memory" => Ok(Self::Memory),
            "wal" => Ok(Self::Wal),
            other => Err(SqliteError::config(format!("unknown journal_mode '{}'", other))),
        }
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: DatabasePath::Memory,
            foreign_keys: true,
            busy_timeout_ms: Some(5000),
            journal_mode: JournalMode::Wal,
            create_if_missing: false,
        }
    }
}

impl SqliteConfig {
    /// Create a new configuration for an in-memory database.
    pub fn memory() -> Self {
        Self {
            path: DatabasePath::Memory,
            ..Default::default()
        }
    }

    /// Create a new configuration for a file-based database.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            path: DatabasePath::File(path.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    /// Parse a SQLite URL into configuration.
    ///
    /// Supported formats:
    /// - `sqlite::memory:` or `:memory:` - In-memory database
    /// - `sqlite://path/to/db.sqlite` - File-based database
    /// - `sqlite:path/to/db.sqlite` - File-based database
    /// - `file:path/to/db.sqlite` - Alternative format
    /// - `path/to/db.sqlite` - Bare path
    ///
    /// Query parameters `foreign_keys`, `busy_timeout` and `journal_mode`
    /// override the defaults. `mode=rwc` allows creating a missing file,
    /// `mode=rw` requires it to exist (the default).
    pub fn from_url(url: impl AsRef<str>) -> SqliteResult<Self> {
        let url_str = url.as_ref().trim();
        if url_str.is_empty() {
            return Err(SqliteError::config("database URL is empty"));
        }

        let (location, query) = match url_str.split_once('?') {
            Some((location, query)) => (location, Some(query)),
            None => (url_str, None),
        };

        let path = if let Some(path) = location.strip_prefix("sqlite://") {
            path
        } else if let Some(path) = location.strip_prefix("sqlite:") {
            path
        } else if let Some(path) = location.strip_prefix("file:") {
            path
        } else {
            location
        };

        let mut config = match path {
            "" => return Err(SqliteError::config("database path is required")),
            ":memory:" => Self::memory(),
            path => Self::file(path),
        };

        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "mode" => match value {
                    "memory" => config.path = DatabasePath::Memory,
                    "rwc" => config.create_if_missing = true,
                    "rw" => config.create_if_missing = false,
                    other => {
                        return Err(SqliteError::config(format!("unsupported mode '{}'", other)));
                    }
                },
                "foreign_keys" => config.foreign_keys = value == "true" || value == "1",
                "busy_timeout" => {
                    let ms = value.parse().map_err(|_| {
                        SqliteError::config(format!("invalid busy_timeout '{}'", value))
                    })?;
                    config.busy_timeout_ms = Some(ms);
                }
                "journal_mode" => config.journal_mode = JournalMode::parse(value)?,
                _ => {}
            }
        }

        Ok(config)
    }

    /// Generate the initialization SQL for this configuration.
    pub fn init_sql(&self) -> String {
        let mut sql = String::new();

        if self.foreign_keys {
            sql.push_str("PRAGMA foreign_keys = ON;\n");
        }

        // In-memory databases always report "memory"; setting WAL is a no-op.
        if !self.path.is_memory() {
            sql.push_str(&format!(
                "PRAGMA journal_mode = {};\n",
                self.journal_mode.as_pragma()
            ));
        }

        if let Some(timeout) = self.busy_timeout_ms {
            sql.push_str(&format!("PRAGMA busy_timeout = {};\n", timeout));
        }

        sql
    }

    /// Enable or disable foreign keys.
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Set the busy timeout in milliseconds.
    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = Some(ms);
        self
    }

    /// Set the journal mode.
    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.journal_mode = mode;
        self
    }

    /// Allow or forbid creating a missing database file.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_url_memory() {
        for url in ["sqlite::memory:", ":memory:", "sqlite://:memory:"] {
            assert!(SqliteConfig::from_url(url).unwrap().path.is_memory(), "{url}");
        }
    }

    #[test]
    fn test_config_from_url_file() {
        let cases = [
            ("sqlite://./test.db", "./test.db"),
            ("sqlite:///tmp/test.db", "/tmp/test.db"),
            ("sqlite:data/test.db", "data/test.db"),
            ("file:test.db", "test.db"),
            ("test.db", "test.db"),
        ];

        for (url, expected) in cases {
            let config = SqliteConfig::from_url(url).unwrap();
            assert_eq!(config.path, DatabasePath::File(PathBuf::from(expected)), "{url}");
        }
    }

    #[test]
    fn test_config_from_url_with_options() {
        let config = SqliteConfig::from_url(
            "sqlite://./test.db?foreign_keys=false&busy_timeout=10000&journal_mode=delete",
        )
        .unwrap();

        assert!(!config.foreign_keys);
        assert_eq!(config.busy_timeout_ms, Some(10000));
        assert_eq!(config.journal_mode, JournalMode::Delete);
    }

    #[test]
    fn test_config_from_url_rejects_bad_input() {
        assert!(SqliteConfig::from_url("").is_err());
        assert!(SqliteConfig::from_url("sqlite://").is_err());
        assert!(SqliteConfig::from_url("sqlite://x.db?busy_timeout=soon").is_err());
        assert!(SqliteConfig::from_url("sqlite://x.db?journal_mode=bogus").is_err());
        assert!(SqliteConfig::from_url("sqlite://x.db?mode=ro").is_err());
    }

    #[test]
    fn test_config_from_url_mode() {
        assert!(!SqliteConfig::from_url("sqlite://x.db").unwrap().create_if_missing);
        assert!(SqliteConfig::from_url("sqlite://x.db?mode=rwc").unwrap().create_if_missing);
        assert!(!SqliteConfig::from_url("sqlite://x.db?mode=rw").unwrap().create_if_missing);
        assert!(SqliteConfig::from_url("sqlite://x.db?mode=memory").unwrap().path.is_memory());
    }

    #[test]
    fn test_init_sql() {
        let sql = SqliteConfig::file("test.db").init_sql();
        assert!(sql.contains("foreign_keys = ON"));
        assert!(sql.contains("journal_mode = WAL"));
        assert!(sql.contains("busy_timeout = 5000"));

        let memory = SqliteConfig::memory().foreign_keys(false).init_sql();
        assert!(!memory.contains("journal_mode"));
        assert!(!memory.contains("foreign_keys"));
    }
}
