//! In-memory fakes shared by the unit tests.

use std::sync::Mutex;

use serde_json::Value as JsonValue;

use crate::database::{Database, DatabaseResult};
use crate::error::{DatabaseError, MigrateResult, MigrationError};
use crate::ledger::{Ledger, LedgerRow, MigrationStatus};

/// Ledger kept in memory. `None` means the table does not exist yet.
#[derive(Default)]
pub struct MemoryLedger {
    rows: Mutex<Option<Vec<LedgerRow>>>,
    writes: Mutex<usize>,
}

impl MemoryLedger {
    pub fn with_rows(rows: Vec<LedgerRow>) -> Self {
        Self {
            rows: Mutex::new(Some(rows)),
            writes: Mutex::new(0),
        }
    }

    pub fn rows(&self) -> Vec<LedgerRow> {
        self.rows.lock().unwrap().clone().unwrap_or_default()
    }

    pub fn row(&self, name: &str) -> Option<LedgerRow> {
        self.rows().into_iter().find(|r| r.name == name)
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn bump(&self) {
        *self.writes.lock().unwrap() += 1;
    }
}

pub fn row(name: &str, fingerprint: &str, status: MigrationStatus) -> LedgerRow {
    LedgerRow {
        name: name.to_string(),
        fingerprint: fingerprint.to_string(),
        status,
        error: None,
        created: None,
    }
}

#[async_trait::async_trait]
impl Ledger for MemoryLedger {
    async fn exists(&self) -> MigrateResult<bool> {
        Ok(self.rows.lock().unwrap().is_some())
    }

    async fn ensure(&self) -> MigrateResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.is_none() {
            *rows = Some(Vec::new());
            self.bump();
        }
        Ok(())
    }

    async fn insert(
        &self,
        name: &str,
        fingerprint: &str,
        status: MigrationStatus,
    ) -> MigrateResult<()> {
        let mut guard = self.rows.lock().unwrap();
        let rows = guard
            .as_mut()
            .ok_or_else(|| MigrationError::Database(DatabaseError::query("no such table")))?;
        if rows.iter().any(|r| r.name == name) {
            return Err(MigrationError::DuplicateMigration(name.to_string()));
        }
        rows.push(row(name, fingerprint, status));
        drop(guard);
        self.bump();
        Ok(())
    }

    async fn update_status(
        &self,
        name: &str,
        status: MigrationStatus,
        error: Option<&str>,
    ) -> MigrateResult<()> {
        let mut guard = self.rows.lock().unwrap();
        let row = guard
            .as_mut()
            .and_then(|rows| rows.iter_mut().find(|r| r.name == name))
            .ok_or_else(|| MigrationError::NotFound(name.to_string()))?;
        row.status = status;
        row.error = match status {
            MigrationStatus::Errored => error.map(str::to_string),
            _ => None,
        };
        drop(guard);
        self.bump();
        Ok(())
    }

    async fn list_rows(&self) -> MigrateResult<Vec<LedgerRow>> {
        Ok(self.rows())
    }
}

/// Database that records batches and fails those containing `fail_marker`.
pub struct ScriptedDatabase {
    pub fail_marker: Option<(String, String)>,
    pub batches: Mutex<Vec<String>>,
}

impl ScriptedDatabase {
    pub fn succeeding() -> Self {
        Self {
            fail_marker: None,
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(marker: &str, message: &str) -> Self {
        Self {
            fail_marker: Some((marker.to_string(), message.to_string())),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn batches(&self) -> Vec<String> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Database for ScriptedDatabase {
    async fn execute(&self, _sql: &str, _params: &[JsonValue]) -> DatabaseResult<Vec<JsonValue>> {
        Err(DatabaseError::query("execute is not scripted"))
    }

    async fn execute_batch(&self, sql: &str) -> DatabaseResult<()> {
        self.batches.lock().unwrap().push(sql.to_string());
        match &self.fail_marker {
            Some((marker, message)) if sql.contains(marker.as_str()) => {
                Err(DatabaseError::query(message.clone()))
            }
            _ => Ok(()),
        }
    }

    async fn table_names(&self) -> DatabaseResult<Vec<String>> {
        Ok(Vec::new())
    }
}
