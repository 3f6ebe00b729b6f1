//! rota - weekly cleanup rota scheduler
//!
//! Works on a directory holding `rota.toml`, `roster.toml` and the files
//! the scheduler writes next to them.

use anyhow::Result;
use clap::Parser;

mod commands;
mod error;
mod logging;
mod workspace;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = cli.run().await {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
