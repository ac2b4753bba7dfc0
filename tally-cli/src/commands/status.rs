//! `tally status` - Show every migration and its ledger state.

use crate::config::Config;
use crate::error::CliResult;
use crate::output;

use super::open_engine;

/// Run the status command
pub async fn run(config: &Config) -> CliResult<()> {
    let engine = open_engine(config, false).await?;
    let set = engine.status().await?;

    if set.is_empty() {
        output::info(&format!(
            "No migrations found in {}",
            config.migrations.directory.display()
        ));
        return Ok(());
    }

    println!("{}", output::status_table(&set));
    output::newline();
    output::info(&output::counts_summary(&set.counts()));

    Ok(())
}
