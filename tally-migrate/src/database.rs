//! Database client seam.
//!
//! The engine never opens connections itself. A backend crate hands it
//! something implementing [`Database`] once connectivity has been verified.

use serde_json::Value as JsonValue;

use crate::error::DatabaseError;

/// Result type for database client calls.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Minimal SQL client used by the ledger and the executor.
#[async_trait::async_trait]
pub trait Database: Send + Sync {
    /// Execute a single statement with positional parameters.
    ///
    /// Rows come back as JSON objects keyed by column name. Statements that
    /// return no rows yield an empty vector.
    async fn execute(&self, sql: &str, params: &[JsonValue]) -> DatabaseResult<Vec<JsonValue>>;

    /// Execute multi-statement text as one batch.
    async fn execute_batch(&self, sql: &str) -> DatabaseResult<()>;

    /// List the names of every table in the database catalog.
    async fn table_names(&self) -> DatabaseResult<Vec<String>>;
}

/// Read a text column from a row object.
pub fn text_column<'a>(row: &'a JsonValue, column: &str) -> Option<&'a str> {
    row.get(column).and_then(JsonValue::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_column() {
        let row = json!({ "name": "1_a", "error": null, "count": 3 });
        assert_eq!(text_column(&row, "name"), Some("1_a"));
        assert_eq!(text_column(&row, "error"), None);
        assert_eq!(text_column(&row, "count"), None);
        assert_eq!(text_column(&row, "missing"), None);
    }
}
