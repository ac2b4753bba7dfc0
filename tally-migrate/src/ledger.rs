//! Migration ledger: the remote table recording attempted migrations.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::database::{Database, text_column};
use crate::error::{MigrateResult, MigrationError};

/// Status of a migration in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    /// Not applied yet, or attempted without a recorded outcome.
    Pending,
    /// The last attempt failed.
    Errored,
    /// Applied successfully.
    Completed,
}

impl MigrationStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [MigrationStatus; 3] = [Self::Pending, Self::Errored, Self::Completed];

    /// Text stored in the ledger's `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Errored => "errored",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationStatus {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| MigrationError::invalid_row(format!("unknown status '{}'", s)))
    }
}

/// One row of the ledger table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Migration name.
    pub name: String,
    /// Fingerprint recorded when the migration was first attempted.
    pub fingerprint: String,
    /// Current status.
    pub status: MigrationStatus,
    /// Failure message, only set for errored migrations.
    pub error: Option<String>,
    /// When the row was inserted.
    pub created: Option<NaiveDateTime>,
}

impl LedgerRow {
    /// Decode a row returned by the database.
    pub fn from_json(row: &JsonValue) -> MigrateResult<Self> {
        let required = |column: &str| {
            text_column(row, column)
                .map(str::to_string)
                .ok_or_else(|| MigrationError::invalid_row(format!("missing column '{}'", column)))
        };

        let name = required("name")?;
        let fingerprint = required("fingerprint")?;
        let status = required("status")?.parse()?;
        let error = text_column(row, "error").map(str::to_string);
        let created = text_column(row, "created")
            .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok());

        Ok(Self {
            name,
            fingerprint,
            status,
            error,
            created,
        })
    }
}

/// Persistence primitives for the ledger table.
///
/// Implementations hold no business rules; reconciliation and the state
/// machine decide what gets written.
#[async_trait::async_trait]
pub trait Ledger: Send + Sync {
    /// Check whether the ledger table exists.
    async fn exists(&self) -> MigrateResult<bool>;

    /// Create the ledger table and its unique index if missing.
    async fn ensure(&self) -> MigrateResult<()>;

    /// Insert a row for a migration with the given status.
    ///
    /// Fails with [`MigrationError::DuplicateMigration`] if the name is
    /// already recorded.
    async fn insert(
        &self,
        name: &str,
        fingerprint: &str,
        status: MigrationStatus,
    ) -> MigrateResult<()>;

    /// Insert a `pending` row for a migration about to run.
    async fn insert_pending(&self, name: &str, fingerprint: &str) -> MigrateResult<()> {
        self.insert(name, fingerprint, MigrationStatus::Pending).await
    }

    /// Update the status of an existing row.
    ///
    /// The error text is only kept for [`MigrationStatus::Errored`]; every
    /// other status clears it. Fails with [`MigrationError::NotFound`] when
    /// no row matches.
    async fn update_status(
        &self,
        name: &str,
        status: MigrationStatus,
        error: Option<&str>,
    ) -> MigrateResult<()>;

    /// Fetch every row, in no particular order.
    async fn list_rows(&self) -> MigrateResult<Vec<LedgerRow>>;
}

/// DDL for the ledger table.
///
/// Both statements are guarded by `IF NOT EXISTS`, so running it against an
/// existing ledger is a no-op.
pub fn ledger_ddl(table: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS "{table}" (
    name TEXT NOT NULL,
    fingerprint TEXT NOT NULL,
    status TEXT NOT NULL,
    error TEXT,
    created TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE UNIQUE INDEX IF NOT EXISTS "{table}_name_unique" ON "{table}" ("name");
"#
    )
}

/// [`Ledger`] stored in a table of the target database.
pub struct SqlLedger<'a, D: Database + ?Sized> {
    db: &'a D,
    table: String,
}

impl<'a, D: Database + ?Sized> SqlLedger<'a, D> {
    /// Create a ledger accessor for `table`.
    ///
    /// The name is interpolated into SQL; validate it with
    /// [`MigrationConfig::validate`](crate::config::MigrationConfig::validate)
    /// first.
    pub fn new(db: &'a D, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }

    /// Name of the ledger table.
    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait::async_trait]
impl<D: Database + ?Sized> Ledger for SqlLedger<'_, D> {
    async fn exists(&self) -> MigrateResult<bool> {
        let tables = self.db.table_names().await?;
        Ok(tables.iter().any(|t| *t == self.table))
    }

    async fn ensure(&self) -> MigrateResult<()> {
        // Not atomic with `exists`; a single operator is assumed.
        if self.exists().await? {
            return Ok(());
        }

        self.db.execute_batch(&ledger_ddl(&self.table)).await?;
        info!(table = %self.table, "Created migration ledger");
        Ok(())
    }

    async fn insert(
        &self,
        name: &str,
        fingerprint: &str,
        status: MigrationStatus,
    ) -> MigrateResult<()> {
        let sql = format!(
            r#"INSERT INTO "{}" (name, fingerprint, status) VALUES (?1, ?2, ?3)"#,
            self.table
        );
        let params = [
            JsonValue::from(name),
            JsonValue::from(fingerprint),
            JsonValue::from(status.as_str()),
        ];

        match self.db.execute(&sql, &params).await {
            Ok(_) => {
                debug!(migration = %name, status = %status, "Inserted ledger row");
                Ok(())
            }
            Err(e) if e.is_unique_violation() => {
                Err(MigrationError::DuplicateMigration(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_status(
        &self,
        name: &str,
        status: MigrationStatus,
        error: Option<&str>,
    ) -> MigrateResult<()> {
        let error = match status {
            MigrationStatus::Errored => error,
            _ => None,
        };

        let sql = format!(
            r#"UPDATE "{}" SET status = ?1, error = ?2 WHERE name = ?3 RETURNING name"#,
            self.table
        );
        let params = [
            JsonValue::from(status.as_str()),
            error.map(JsonValue::from).unwrap_or(JsonValue::Null),
            JsonValue::from(name),
        ];

        let updated = self.db.execute(&sql, &params).await?;
        if updated.is_empty() {
            return Err(MigrationError::NotFound(name.to_string()));
        }

        debug!(migration = %name, status = %status, "Updated ledger row");
        Ok(())
    }

    async fn list_rows(&self) -> MigrateResult<Vec<LedgerRow>> {
        let sql = format!(
            r#"SELECT name, fingerprint, status, error, created FROM "{}""#,
            self.table
        );

        self.db
            .execute(&sql, &[])
            .await?
            .iter()
            .map(LedgerRow::from_json)
            .collect()
    }
}
