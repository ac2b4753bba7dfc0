//! Reconciliation of local migrations with the ledger.
//!
//! Reconciliation is all-or-nothing. A ledger row without a local migration,
//! or a recorded fingerprint that no longer matches the local body, fails the
//! whole set: nothing may run until the tree and the ledger agree again.

use std::collections::HashMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MigrateResult, MigrationError};
use crate::file::{LocalMigration, discover};
use crate::ledger::{Ledger, MigrationStatus};

/// A local migration merged with its ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledMigration {
    /// Migration name.
    pub name: String,
    /// Path to the migration directory.
    pub path: PathBuf,
    /// Contents of `up.sql`.
    pub body: String,
    /// Fingerprint of `body`.
    pub fingerprint: String,
    /// Ledger status, `pending` when the ledger has no row.
    pub status: MigrationStatus,
    /// Failure message from the ledger.
    pub error: Option<String>,
    /// Whether the ledger has a row for this migration.
    pub tracked: bool,
}

impl ReconciledMigration {
    /// Build an entry for a migration the ledger has never seen.
    pub fn untracked(local: LocalMigration) -> Self {
        Self::build(local, MigrationStatus::Pending, None, false)
    }

    fn with_status(local: LocalMigration, status: MigrationStatus, error: Option<String>) -> Self {
        Self::build(local, status, error, true)
    }

    fn build(
        local: LocalMigration,
        status: MigrationStatus,
        error: Option<String>,
        tracked: bool,
    ) -> Self {
        Self {
            name: local.name,
            path: local.path,
            body: local.body,
            fingerprint: local.fingerprint,
            status,
            error,
            tracked,
        }
    }

    /// Check if the migration still has to run.
    pub fn is_pending(&self) -> bool {
        self.status == MigrationStatus::Pending
    }

    /// Check if the last attempt failed.
    pub fn is_errored(&self) -> bool {
        self.status == MigrationStatus::Errored
    }

    /// Check if the migration has been applied.
    pub fn is_completed(&self) -> bool {
        self.status == MigrationStatus::Completed
    }
}

/// Merge discovered migrations with the ledger.
///
/// The result keeps the order of `local` (name order when it comes from
/// [`discover`]). Performs no ledger writes.
pub async fn reconcile<L: Ledger + ?Sized>(
    local: Vec<LocalMigration>,
    ledger: &L,
) -> MigrateResult<Vec<ReconciledMigration>> {
    if !ledger.exists().await? {
        debug!("No ledger table yet, every migration is pending");
        return Ok(local.into_iter().map(ReconciledMigration::untracked).collect());
    }

    let rows = ledger.list_rows().await?;
    let by_name: HashMap<&str, &LocalMigration> =
        local.iter().map(|m| (m.name.as_str(), m)).collect();

    let mut missing: Vec<String> = rows
        .iter()
        .filter(|row| !by_name.contains_key(row.name.as_str()))
        .map(|row| row.name.clone())
        .collect();

    if !missing.is_empty() {
        missing.sort();
        warn!(migrations = ?missing, "Ledger references migrations missing locally");
        return Err(MigrationError::MissingMigrationFiles(missing));
    }

    let mut drifted: Vec<String> = rows
        .iter()
        .filter(|row| by_name[row.name.as_str()].fingerprint != row.fingerprint)
        .map(|row| row.name.clone())
        .collect();

    if !drifted.is_empty() {
        drifted.sort();
        warn!(migrations = ?drifted, "Migrations modified after they were recorded");
        return Err(MigrationError::FingerprintMismatch(drifted));
    }

    let mut rows_by_name: HashMap<String, _> =
        rows.into_iter().map(|row| (row.name.clone(), row)).collect();

    Ok(local
        .into_iter()
        .map(|migration| match rows_by_name.remove(&migration.name) {
            Some(row) => ReconciledMigration::with_status(migration, row.status, row.error),
            None => ReconciledMigration::untracked(migration),
        })
        .collect())
}

/// Discover the migrations under `dir` and reconcile them with the ledger.
pub async fn discover_and_reconcile<L: Ledger + ?Sized>(
    dir: impl AsRef<Path>,
    ledger: &L,
) -> MigrateResult<MigrationSet> {
    let local = discover(dir).await?;
    reconcile(local, ledger).await.map(MigrationSet::new)
}

/// Number of migrations in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Pending migrations.
    pub pending: usize,
    /// Errored migrations.
    pub errored: usize,
    /// Completed migrations.
    pub completed: usize,
}

impl StatusCounts {
    /// Total number of migrations.
    pub fn total(&self) -> usize {
        self.pending + self.errored + self.completed
    }
}

/// Reconciled migrations, in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSet {
    migrations: Vec<ReconciledMigration>,
}

impl MigrationSet {
    /// Wrap reconciled migrations.
    pub fn new(migrations: Vec<ReconciledMigration>) -> Self {
        Self { migrations }
    }

    /// Find a migration by name.
    pub fn find(&self, name: &str) -> Option<&ReconciledMigration> {
        self.migrations.iter().find(|m| m.name == name)
    }

    /// First pending migration.
    pub fn next_pending(&self) -> Option<&ReconciledMigration> {
        self.migrations.iter().find(|m| m.is_pending())
    }

    /// All errored migrations.
    pub fn errored(&self) -> Vec<&ReconciledMigration> {
        self.migrations.iter().filter(|m| m.is_errored()).collect()
    }

    /// First errored migration.
    pub fn first_errored(&self) -> Option<&ReconciledMigration> {
        self.migrations.iter().find(|m| m.is_errored())
    }

    /// Check if any migration is errored.
    pub fn has_errors(&self) -> bool {
        self.migrations.iter().any(ReconciledMigration::is_errored)
    }

    /// Count migrations per status.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for migration in &self.migrations {
            match migration.status {
                MigrationStatus::Pending => counts.pending += 1,
                MigrationStatus::Errored => counts.errored += 1,
                MigrationStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }

    /// Unwrap into the underlying vector.
    pub fn into_inner(self) -> Vec<ReconciledMigration> {
        self.migrations
    }
}

impl Deref for MigrationSet {
    type Target = [ReconciledMigration];

    fn deref(&self) -> &Self::Target {
        &self.migrations
    }
}

impl IntoIterator for MigrationSet {
    type Item = ReconciledMigration;
    type IntoIter = std::vec::IntoIter<ReconciledMigration>;

    fn into_iter(self) -> Self::IntoIter {
        self.migrations.into_iter()
    }
}
