//! CLI command implementations.

pub mod create;
pub mod migrate;
pub mod resolve;
pub mod retry;
pub mod status;

use tally_migrate::{ExecutionOutcome, MigrationEngine};
use tally_sqlite::{SqliteConfig, SqliteDatabase};

use crate::config::Config;
use crate::error::CliResult;
use crate::output;

/// Connect to the configured database and build an engine over it.
///
/// Only `migrate` passes `create`; every other command requires the database
/// file to exist.
pub(crate) async fn open_engine(
    config: &Config,
    create: bool,
) -> CliResult<MigrationEngine<SqliteDatabase>> {
    let mut sqlite = SqliteConfig::from_url(config.database_url()?)?;
    sqlite.create_if_missing |= create;

    let db = SqliteDatabase::connect(sqlite).await?;
    Ok(MigrationEngine::new(db, config.migration_config())?)
}

/// Print the outcome of an execution.
///
/// A failed body is an expected, recorded outcome, so it is reported here
/// and not turned into a process failure.
pub(crate) fn report_outcome(outcome: &ExecutionOutcome) {
    match outcome {
        ExecutionOutcome::Completed { name, duration_ms } => {
            output::success(&format!("Migration {} completed in {}ms", name, duration_ms));
        }
        ExecutionOutcome::Errored { name, message } => {
            output::error(&format!("Migration {} failed:", name));
            eprintln!("{}", message);
            output::newline();
            output::info("Fix the cause, then run `tally retry` or `tally resolve`.");
        }
    }
}
