//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// extup - keep installed extensions current with their sources
#[derive(Parser, Debug)]
#[command(name = "extup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to updater config file
    #[arg(short, long, global = true, env = "EXTUP_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List installed extensions
    List(ListArgs),

    /// Check installed extensions for updates
    Check(CheckArgs),

    /// Update one extension or every extension with an update available
    Update(UpdateArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Extensions to check (all installed when empty)
    pub extensions: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Extension to update
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub name: Option<String>,

    /// Update every extension with an update available
    #[arg(long)]
    pub all: bool,

    /// Reinstall even when no newer revision was detected
    #[arg(long, requires = "name")]
    pub force: bool,
}
