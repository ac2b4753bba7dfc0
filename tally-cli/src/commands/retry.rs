//! `tally retry` - Re-run the first errored migration.

use crate::cli::ConfirmArgs;
use crate::config::Config;
use crate::error::CliResult;
use crate::output;

use super::{open_engine, report_outcome};

/// Run the retry command
pub async fn run(args: ConfirmArgs, config: &Config) -> CliResult<()> {
    let engine = open_engine(config, false).await?;

    let Some(migration) = engine.next_errored().await? else {
        output::success("There are no errored migrations");
        return Ok(());
    };

    if let Some(error) = &migration.error {
        output::kv("Last error", error);
    }

    if !args.yes && !output::confirm(&format!("Migrate {}?", migration.name)) {
        output::info("Retry cancelled.");
        return Ok(());
    }

    let outcome = engine.reapply(&migration).await?;
    report_outcome(&outcome);

    Ok(())
}
