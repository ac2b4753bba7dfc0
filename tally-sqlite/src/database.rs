//! SQLite implementation of the migration [`Database`] seam.

use rusqlite::OpenFlags;
use serde_json::Value as JsonValue;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use tally_migrate::{Database, DatabaseError, DatabaseResult};

use crate::config::{DatabasePath, SqliteConfig};
use crate::error::{SqliteError, SqliteResult};
use crate::types::{get_value_at_index, json_to_sqlite};

/// A SQLite database the migration engine can run against.
///
/// Wraps a single `tokio-rusqlite` connection; statements are serialized on
/// its background thread.
pub struct SqliteDatabase {
    conn: Connection,
    config: SqliteConfig,
}

impl SqliteDatabase {
    /// Open the database, apply the configured PRAGMAs and verify it answers.
    ///
    /// A missing file is an error unless
    /// [`create_if_missing`](SqliteConfig::create_if_missing) is set.
    pub async fn connect(config: SqliteConfig) -> SqliteResult<Self> {
        let target = config.path.display();

        let conn = match &config.path {
            DatabasePath::Memory => Connection::open_in_memory().await,
            DatabasePath::File(path) => {
                let mut flags = OpenFlags::default();
                if !config.create_if_missing {
                    flags.remove(OpenFlags::SQLITE_OPEN_CREATE);
                }
                Connection::open_with_flags(path, flags).await
            }
        }
        .map_err(|e| connect_failure(&target, e.into()))?;

        let init_sql = config.init_sql();
        conn.call(move |conn| {
            conn.execute_batch(&init_sql)?;
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
        .map_err(|e| connect_failure(&target, e.into()))?;

        info!(path = %target, "Connected to SQLite database");
        Ok(Self { conn, config })
    }

    /// Parse a URL and connect.
    pub async fn connect_url(url: &str) -> SqliteResult<Self> {
        Self::connect(SqliteConfig::from_url(url)?).await
    }

    /// Get the configuration.
    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Close the connection, waiting for pending statements.
    pub async fn close(self) -> SqliteResult<()> {
        self.conn.close().await.map_err(SqliteError::from)
    }

    async fn query_json(&self, sql: &str, params: &[JsonValue]) -> SqliteResult<Vec<JsonValue>> {
        let sql = sql.to_string();
        let params: Vec<rusqlite::types::Value> = params.iter().map(json_to_sqlite).collect();
        debug!(sql = %sql, params = params.len(), "Executing statement");

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let columns: Vec<String> = stmt
                    .column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect();

                let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
                let mut results = Vec::new();
                while let Some(row) = rows.next()? {
                    let mut map = serde_json::Map::new();
                    for (i, col) in columns.iter().enumerate() {
                        map.insert(col.clone(), get_value_at_index(row, i));
                    }
                    results.push(JsonValue::Object(map));
                }
                Ok(results)
            })
            .await
            .map_err(SqliteError::from)
    }
}

fn connect_failure(target: &str, err: SqliteError) -> SqliteError {
    SqliteError::connection(format!(
        "{} Could not connect to the database at {}. Please check the database URL.",
        err.message(),
        target
    ))
}

#[async_trait::async_trait]
impl Database for SqliteDatabase {
    async fn execute(&self, sql: &str, params: &[JsonValue]) -> DatabaseResult<Vec<JsonValue>> {
        self.query_json(sql, params)
            .await
            .map_err(DatabaseError::from)
    }

    async fn execute_batch(&self, sql: &str) -> DatabaseResult<()> {
        let sql = sql.to_string();
        debug!(bytes = sql.len(), "Executing batch");

        self.conn
            .call(move |conn| Ok(conn.execute_batch(&sql)?))
            .await
            .map_err(|e| DatabaseError::from(SqliteError::from(e)))
    }

    async fn table_names(&self) -> DatabaseResult<Vec<String>> {
        let rows = self
            .query_json("SELECT name FROM sqlite_master WHERE type = 'table'", &[])
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| tally_migrate::text_column(row, "name"))
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn memory() -> SqliteDatabase {
        SqliteDatabase::connect(SqliteConfig::memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_execute_returns_rows_as_objects() {
        let db = memory().await;
        db.execute_batch("CREATE TABLE t (id INTEGER, label TEXT); INSERT INTO t VALUES (1, 'a');")
            .await
            .unwrap();

        let rows = db
            .execute("SELECT id, label FROM t WHERE id = ?1", &[json!(1)])
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({ "id": 1, "label": "a" })]);
    }

    #[tokio::test]
    async fn test_execute_without_rows() {
        let db = memory().await;
        db.execute_batch("CREATE TABLE t (id INTEGER)").await.unwrap();

        let rows = db
            .execute("INSERT INTO t (id) VALUES (?1)", &[json!(7)])
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_batch_error_keeps_driver_message() {
        let db = memory().await;
        let err = db
            .execute_batch("SELECT * FROM missing_table;")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "no such table: missing_table");
    }

    #[tokio::test]
    async fn test_table_names() {
        let db = memory().await;
        assert!(db.table_names().await.unwrap().is_empty());

        db.execute_batch("CREATE TABLE a (x); CREATE TABLE b (y);")
            .await
            .unwrap();
        let mut names = db.table_names().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_unique_violation_kind() {
        let db = memory().await;
        db.execute_batch("CREATE TABLE t (name TEXT); CREATE UNIQUE INDEX t_name ON t (name);")
            .await
            .unwrap();
        db.execute("INSERT INTO t VALUES (?1)", &[json!("x")])
            .await
            .unwrap();

        let err = db
            .execute("INSERT INTO t VALUES (?1)", &[json!("x")])
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.db");

        let result = SqliteDatabase::connect(SqliteConfig::file(&path)).await;

        assert!(matches!(result, Err(SqliteError::Connection(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_create_if_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.db");

        let db = SqliteDatabase::connect(SqliteConfig::file(&path).create_if_missing(true))
            .await
            .unwrap();
        db.close().await.unwrap();
        assert!(path.exists());

        SqliteDatabase::connect(SqliteConfig::file(&path)).await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_failure_hints_at_url() {
        let result =
            SqliteDatabase::connect(SqliteConfig::file("/nonexistent-tally-dir/nested/db.sqlite"))
                .await;

        match result {
            Err(SqliteError::Connection(msg)) => {
                assert!(msg.contains("Please check the database URL"))
            }
            Err(other) => panic!("expected connection error, got {other}"),
            Ok(_) => panic!("expected connection error"),
        }
    }
}
