use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::replay::{CheckArgs, ReplayArgs, run_check, run_replay};

#[derive(Debug, Parser)]
#[command(
    name = "noria-replay",
    about = "Replay recorded noria-web update transcripts against a headless document",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply every frame and print the resulting tree and diagnostics.
    Replay(ReplayArgs),

    /// Decode every frame and print per-kind message counts.
    Check(CheckArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => run_replay(args),
        Commands::Check(args) => run_check(args),
    }
}
