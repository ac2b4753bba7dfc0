//! Migration execution and the ledger state machine.
//!
//! ```text
//!            ┌───────────┐  body ok   ┌───────────┐
//!  insert ──▶│  pending  │───────────▶│ completed │
//!            └───────────┘            └───────────┘
//!                  │ body failed            ▲
//!                  ▼                        │ retry ok
//!            ┌───────────┐ ───────────────┘
//!            │  errored  │ ◀──┐
//!            └───────────┘ ───┘ retry failed
//! ```
//!
//! Inserting the `pending` row, running the body and recording the outcome
//! are three independent statements. A crash between them leaves the row
//! `pending` even though the body may have partially run.

use std::time::Instant;

use tracing::{info, warn};

use crate::database::Database;
use crate::error::{MigrateResult, MigrationError};
use crate::ledger::{Ledger, MigrationStatus};
use crate::reconcile::ReconciledMigration;

/// Outcome of executing a migration body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The body ran and the migration is now `completed`.
    Completed {
        /// Migration name.
        name: String,
        /// Time spent running the body.
        duration_ms: i64,
    },
    /// The body failed and the migration is now `errored`.
    Errored {
        /// Migration name.
        name: String,
        /// Failure message recorded in the ledger.
        message: String,
    },
}

impl ExecutionOutcome {
    /// Name of the executed migration.
    pub fn name(&self) -> &str {
        match self {
            Self::Completed { name, .. } | Self::Errored { name, .. } => name,
        }
    }

    /// Check if the migration completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Failure message, if the migration errored.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Errored { message, .. } => Some(message),
            Self::Completed { .. } => None,
        }
    }

    /// Status the ledger now records.
    pub fn status(&self) -> MigrationStatus {
        match self {
            Self::Completed { .. } => MigrationStatus::Completed,
            Self::Errored { .. } => MigrationStatus::Errored,
        }
    }
}

/// Run a migration body and record the result in the ledger.
///
/// With `create_pending_row` the ledger is created if needed and a `pending`
/// row inserted first; otherwise the row must already exist (retry path).
///
/// A failing body is not an error: it is recorded as `errored` and returned
/// as [`ExecutionOutcome::Errored`]. Errors are only returned when the
/// ledger itself cannot be written.
pub async fn execute<D, L>(
    db: &D,
    ledger: &L,
    migration: &ReconciledMigration,
    create_pending_row: bool,
) -> MigrateResult<ExecutionOutcome>
where
    D: Database + ?Sized,
    L: Ledger + ?Sized,
{
    if create_pending_row {
        ledger.ensure().await?;
        ledger
            .insert_pending(&migration.name, &migration.fingerprint)
            .await?;
    }

    let start = Instant::now();
    match db.execute_batch(&migration.body).await {
        Ok(()) => {
            ledger
                .update_status(&migration.name, MigrationStatus::Completed, None)
                .await?;

            let duration_ms = start.elapsed().as_millis() as i64;
            info!(migration = %migration.name, duration_ms, "Migration completed");

            Ok(ExecutionOutcome::Completed {
                name: migration.name.clone(),
                duration_ms,
            })
        }
        Err(e) => {
            let message = e.to_string();
            ledger
                .update_status(&migration.name, MigrationStatus::Errored, Some(&message))
                .await?;

            warn!(migration = %migration.name, error = %message, "Migration failed");

            Ok(ExecutionOutcome::Errored {
                name: migration.name.clone(),
                message,
            })
        }
    }
}

/// Force a migration's ledger status, bypassing execution.
///
/// - `completed`: updates the row, or records a new one when the ledger has
///   never seen the migration.
/// - `pending`: updates an existing row; a migration without a row is
///   already pending, so nothing is written.
/// - `errored`: rejected, errors only come from real executions.
///
/// Any stored error text is cleared.
pub async fn mark_status<L: Ledger + ?Sized>(
    ledger: &L,
    migration: &ReconciledMigration,
    status: MigrationStatus,
) -> MigrateResult<()> {
    if status == MigrationStatus::Errored {
        return Err(MigrationError::InvalidStatusOverride {
            name: migration.name.clone(),
            status: status.to_string(),
        });
    }

    let tracked = ledger.exists().await?
        && ledger
            .list_rows()
            .await?
            .iter()
            .any(|row| row.name == migration.name);

    if tracked {
        ledger.update_status(&migration.name, status, None).await?;
    } else if status == MigrationStatus::Completed {
        ledger.ensure().await?;
        ledger
            .insert(&migration.name, &migration.fingerprint, status)
            .await?;
    }

    info!(migration = %migration.name, status = %status, "Migration status overridden");
    Ok(())
}
