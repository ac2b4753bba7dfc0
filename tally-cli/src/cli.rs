//! CLI argument definitions using clap.

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

use tally_migrate::MigrationStatus;

/// Tally - forward-only SQL migrations with a ledger
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(version)]
#[command(about = "Tally - forward-only SQL migrations with a ledger", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Connection options shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options accepted before or after any subcommand
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Database URL (e.g. sqlite://./app.db)
    #[arg(long, env = "TALLY_DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Directory holding one sub-directory per migration
    #[arg(long, env = "TALLY_MIGRATIONS_DIR", global = true)]
    pub migrations_dir: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, default_value = crate::config::CONFIG_FILE_NAME, global = true)]
    pub config: PathBuf,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the status of every migration
    Status,

    /// Apply the next pending migration
    Migrate(ConfirmArgs),

    /// Retry the first errored migration
    Retry(ConfirmArgs),

    /// Override the recorded status of a migration
    Resolve(ResolveArgs),

    /// Create a new, empty migration
    Create(CreateArgs),
}

/// Arguments for commands that ask before running SQL
#[derive(Args, Debug)]
pub struct ConfirmArgs {
    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the `resolve` command
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["completed", "pending"])))]
pub struct ResolveArgs {
    /// Name of the migration to resolve
    pub migration: String,

    /// Mark the migration as completed without running it
    #[arg(long)]
    pub completed: bool,

    /// Mark the migration as pending so it runs again
    #[arg(long)]
    pub pending: bool,
}

impl ResolveArgs {
    /// Status requested on the command line.
    pub fn status(&self) -> MigrationStatus {
        if self.completed {
            MigrationStatus::Completed
        } else {
            MigrationStatus::Pending
        }
    }
}

/// Arguments for the `create` command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Name for the migration
    #[arg(default_value = "migration")]
    pub name: String,
}
