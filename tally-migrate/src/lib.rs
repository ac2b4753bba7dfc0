//! # tally-migrate
//!
//! Forward-only migration ledger for SQL databases.
//!
//! This crate provides functionality for:
//! - Discovering migrations as directories holding an `up.sql` body
//! - Fingerprinting bodies so edits after application are detected
//! - Reconciling the local tree with a ledger table in the target database
//! - Applying one migration at a time and recording the outcome
//! - Retrying errored migrations and overriding their recorded status
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────┐
//! │ migrations/  │────▶│   Reconcile    │◀────│   Ledger    │
//! └──────────────┘     └────────────────┘     └─────────────┘
//!                              │                     ▲
//!                              ▼                     │
//!                      ┌────────────────┐     ┌─────────────┐
//!                      │ Select (engine)│────▶│  Executor   │
//!                      └────────────────┘     └─────────────┘
//!                                                    │
//!                                                    ▼
//!                                             ┌─────────────┐
//!                                             │  Database   │
//!                                             └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use tally_migrate::{MigrationConfig, MigrationEngine};
//!
//! async fn run(db: impl tally_migrate::Database) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MigrationConfig::new().migrations_dir("./migrations");
//!     let engine = MigrationEngine::new(db, config)?;
//!
//!     let set = engine.status().await?;
//!     println!("{} pending", set.counts().pending);
//!
//!     while let Some(outcome) = engine.migrate_next().await? {
//!         if !outcome.is_completed() {
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Migration Files
//!
//! ```text
//! migrations/
//! ├── 20240115103000_create_users/
//! │   └── up.sql
//! └── 20240116090000_add_posts/
//!     └── up.sql
//! ```
//!
//! Names are ordered byte-wise, so timestamp prefixes give chronological
//! order. There are no down migrations.

pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod executor;
pub mod file;
pub mod ledger;
pub mod reconcile;

#[cfg(test)]
mod testing;

pub use config::{DEFAULT_LEDGER_TABLE, DEFAULT_MIGRATIONS_DIR, MigrationConfig};
pub use database::{Database, DatabaseResult, text_column};
pub use engine::{MigrationEngine, select_next, select_retry};
pub use error::{DatabaseError, DatabaseErrorKind, MigrateResult, MigrationError};
pub use executor::{ExecutionOutcome, execute, mark_status};
pub use file::{LocalMigration, MIGRATION_FILE_NAME, discover, fingerprint};
pub use ledger::{Ledger, LedgerRow, MigrationStatus, SqlLedger, ledger_ddl};
pub use reconcile::{
    MigrationSet, ReconciledMigration, StatusCounts, discover_and_reconcile, reconcile,
};
