//! Migration engine: selection policy and the operator-facing façade.

use tracing::{debug, info};

use crate::config::MigrationConfig;
use crate::database::Database;
use crate::error::{MigrateResult, MigrationError};
use crate::executor::{ExecutionOutcome, execute, mark_status};
use crate::ledger::{MigrationStatus, SqlLedger};
use crate::reconcile::{MigrationSet, ReconciledMigration, discover_and_reconcile};

/// Pick the next migration to apply.
///
/// Any errored migration blocks forward progress: the result is
/// [`MigrationError::Blocked`] listing every errored name, even when a later
/// migration is pending. `Ok(None)` means everything has been applied.
pub fn select_next(set: &MigrationSet) -> MigrateResult<Option<&ReconciledMigration>> {
    let errored = set.errored();
    if !errored.is_empty() {
        return Err(MigrationError::Blocked(
            errored.into_iter().map(|m| m.name.clone()).collect(),
        ));
    }

    Ok(set.next_pending())
}

/// Pick the migration to retry: the first errored one, if any.
pub fn select_retry(set: &MigrationSet) -> Option<&ReconciledMigration> {
    set.first_errored()
}

/// Runs migrations from a directory against a database, one at a time.
///
/// Every operation reconciles from scratch, so the engine holds no state
/// besides the connection and the configuration.
pub struct MigrationEngine<D: Database> {
    db: D,
    config: MigrationConfig,
}

impl<D: Database> MigrationEngine<D> {
    /// Create a new engine. The configuration is validated first.
    pub fn new(db: D, config: MigrationConfig) -> MigrateResult<Self> {
        config.validate()?;
        Ok(Self { db, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Get the database client.
    pub fn database(&self) -> &D {
        &self.db
    }

    /// Ledger accessor for the configured table.
    pub fn ledger(&self) -> SqlLedger<'_, D> {
        SqlLedger::new(&self.db, self.config.table_name.clone())
    }

    /// Reconcile the migrations directory with the ledger.
    pub async fn status(&self) -> MigrateResult<MigrationSet> {
        discover_and_reconcile(&self.config.migrations_dir, &self.ledger()).await
    }

    /// Next migration `migrate` would apply, without running it.
    pub async fn next_pending(&self) -> MigrateResult<Option<ReconciledMigration>> {
        let set = self.status().await?;
        Ok(select_next(&set)?.cloned())
    }

    /// Next migration `retry` would run, without running it.
    pub async fn next_errored(&self) -> MigrateResult<Option<ReconciledMigration>> {
        let set = self.status().await?;
        Ok(select_retry(&set).cloned())
    }

    /// Apply a pending migration.
    ///
    /// A new ledger row is recorded unless one already exists, which is the
    /// case after `resolve --pending` or an interrupted run. Such a row is
    /// re-run in place.
    pub async fn apply(&self, migration: &ReconciledMigration) -> MigrateResult<ExecutionOutcome> {
        info!(migration = %migration.name, rerun = migration.tracked, "Applying migration");
        execute(&self.db, &self.ledger(), migration, !migration.tracked).await
    }

    /// Re-run an errored migration against its existing ledger row.
    pub async fn reapply(
        &self,
        migration: &ReconciledMigration,
    ) -> MigrateResult<ExecutionOutcome> {
        info!(migration = %migration.name, "Retrying migration");
        execute(&self.db, &self.ledger(), migration, false).await
    }

    /// Apply the next pending migration, if any.
    pub async fn migrate_next(&self) -> MigrateResult<Option<ExecutionOutcome>> {
        match self.next_pending().await? {
            Some(migration) => self.apply(&migration).await.map(Some),
            None => {
                debug!("No pending migrations");
                Ok(None)
            }
        }
    }

    /// Retry the first errored migration, if any.
    pub async fn retry(&self) -> MigrateResult<Option<ExecutionOutcome>> {
        match self.next_errored().await? {
            Some(migration) => self.reapply(&migration).await.map(Some),
            None => {
                debug!("No errored migrations");
                Ok(None)
            }
        }
    }

    /// Force the ledger status of a migration by name.
    pub async fn resolve(&self, name: &str, status: MigrationStatus) -> MigrateResult<()> {
        let set = self.status().await?;
        let migration = set
            .find(name)
            .ok_or_else(|| MigrationError::NotFound(name.to_string()))?;

        mark_status(&self.ledger(), migration, status).await
    }
}
