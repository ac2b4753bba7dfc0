//! `tally resolve` - Override the recorded status of a migration.

use crate::cli::ResolveArgs;
use crate::config::Config;
use crate::error::CliResult;
use crate::output;

use super::open_engine;

/// Run the resolve command
pub async fn run(args: ResolveArgs, config: &Config) -> CliResult<()> {
    let engine = open_engine(config, false).await?;
    let status = args.status();

    engine.resolve(&args.migration, status).await?;
    output::success(&format!("Marked {} as {}", args.migration, status));

    Ok(())
}
