//! # Tally
//!
//! Forward-only SQL migrations tracked in a ledger table.
//!
//! Tally provides:
//! - Discovery of migrations stored as `<name>/up.sql` directories
//! - Content fingerprints that catch edits to migrations already run
//! - A ledger table recording each migration as pending, errored or completed
//! - A SQLite backend built on `tokio-rusqlite`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tally::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = SqliteDatabase::connect_url("sqlite://./app.db").await?;
//!     let engine = MigrationEngine::new(db, MigrationConfig::default())?;
//!
//!     while let Some(outcome) = engine.migrate_next().await? {
//!         if let Some(error) = outcome.error_message() {
//!             eprintln!("{} failed: {}", outcome.name(), error);
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Migration discovery, reconciliation and execution.
pub mod migrate {
    pub use tally_migrate::*;
}

/// SQLite backend.
#[cfg(feature = "sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "sqlite")))]
pub mod sqlite {
    pub use tally_sqlite::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        Database, ExecutionOutcome, Ledger, MigrationConfig, MigrationEngine, MigrationError,
        MigrationSet, MigrationStatus, ReconciledMigration,
    };
    #[cfg(feature = "sqlite")]
    pub use crate::sqlite::{SqliteConfig, SqliteDatabase};
}

// Re-export key types at the crate root
pub use tally_migrate::{MigrateResult, MigrationError};
