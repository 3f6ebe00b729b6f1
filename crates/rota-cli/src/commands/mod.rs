//! CLI commands.

mod init;
mod report;
mod schedule;
mod state;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::workspace::Workspace;

/// rota - weekly cleanup rota scheduler.
#[derive(Debug, Parser)]
#[command(name = "rota")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding rota.toml, roster.toml and the scheduler state.
    #[arg(long, global = true, env = "ROTA_DIR", default_value = ".")]
    dir: PathBuf,

    /// Debug logging (per-cleanup slot fills).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Derive the quota contract and start an empty semester.
    Init(init::InitCommand),

    /// Assign the next week(s).
    Schedule(schedule::ScheduleCommand),

    /// Undo the most recent week.
    Rollback,

    /// Recompute the checkpoint from assignments.json.
    Rebuild,

    /// Check the checkpoint against its history and assignments.json.
    Verify,

    /// Per-person tallies and rule violations.
    Summary(report::SummaryCommand),

    /// Print committed weeks.
    Show(report::ShowCommand),
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let ws = Workspace::new(self.dir);

        match self.command {
            Commands::Init(cmd) => cmd.run(&ws).await,
            Commands::Schedule(cmd) => cmd.run(&ws).await,
            Commands::Rollback => state::rollback(&ws).await,
            Commands::Rebuild => state::rebuild(&ws).await,
            Commands::Verify => state::verify(&ws).await,
            Commands::Summary(cmd) => cmd.run(&ws).await,
            Commands::Show(cmd) => cmd.run(&ws).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn schedule_flags_parse() {
        let cli = Cli::try_parse_from(["rota", "--dir", "/tmp/x", "schedule", "--weeks", "3", "--seed", "7"])
            .unwrap();
        assert_eq!(cli.dir, PathBuf::from("/tmp/x"));
        assert!(matches!(cli.command, Commands::Schedule(_)));
    }

    #[test]
    fn weeks_and_all_conflict() {
        assert!(Cli::try_parse_from(["rota", "schedule", "--weeks", "3", "--all"]).is_err());
    }
}
