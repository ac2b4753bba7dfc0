//! Tally CLI - forward-only SQL migrations with a ledger.

use clap::Parser;

use tally_cli::cli::{Cli, Command};
use tally_cli::commands;
use tally_cli::config::Config;
use tally_cli::error::CliResult;
use tally_cli::{logging, output};

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.global.config)?.with_overrides(&cli.global);

    match cli.command {
        Command::Status => commands::status::run(&config).await,
        Command::Migrate(args) => commands::migrate::run(args, &config).await,
        Command::Retry(args) => commands::retry::run(args, &config).await,
        Command::Resolve(args) => commands::resolve::run(args, &config).await,
        Command::Create(args) => commands::create::run(args, &config).await,
    }
}
