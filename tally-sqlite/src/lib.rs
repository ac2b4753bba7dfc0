//! SQLite backend for tally migrations.
//!
//! This crate implements the [`tally_migrate::Database`] seam on top of
//! `tokio-rusqlite`, so a migration tree can be applied to a local SQLite
//! file or an in-memory database.
//!
//! # Example
//!
//! ```rust,ignore
//! use tally_migrate::{MigrationConfig, MigrationEngine};
//! use tally_sqlite::SqliteDatabase;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = SqliteDatabase::connect_url("sqlite://./app.db").await?;
//!     let engine = MigrationEngine::new(db, MigrationConfig::default())?;
//!
//!     for migration in engine.status().await?.iter() {
//!         println!("{} {}", migration.name, migration.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod types;

pub use config::{DatabasePath, JournalMode, SqliteConfig};
pub use database::SqliteDatabase;
pub use error::{SqliteError, SqliteResult};
