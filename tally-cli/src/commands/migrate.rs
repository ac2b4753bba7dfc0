//! `tally migrate` - Apply the next pending migration.

use crate::cli::ConfirmArgs;
use crate::config::Config;
use crate::error::CliResult;
use crate::output;

use super::{open_engine, report_outcome};

/// Run the migrate command
///
/// Refuses to run anything while a migration is errored; the engine reports
/// the blocking names.
pub async fn run(args: ConfirmArgs, config: &Config) -> CliResult<()> {
    let engine = open_engine(config, true).await?;

    let Some(migration) = engine.next_pending().await? else {
        output::success("All migrations have been applied");
        return Ok(());
    };

    if migration.tracked {
        output::warn(&format!(
            "{} already has a pending ledger row and will be run again",
            migration.name
        ));
    }

    if !args.yes && !output::confirm(&format!("Migrate {}?", migration.name)) {
        output::info("Migration cancelled.");
        return Ok(());
    }

    let outcome = engine.apply(&migration).await?;
    report_outcome(&outcome);

    Ok(())
}
