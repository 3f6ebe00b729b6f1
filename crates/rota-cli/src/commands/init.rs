//! `rota init`

use anyhow::{Result, bail};
use clap::Args;
use rota_core::ports::CheckpointStore;

use crate::workspace::{CONTRACT_FILE, Workspace};

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Discard already scheduled weeks.
    #[arg(long)]
    force: bool,
}

impl InitCommand {
    pub async fn run(self, ws: &Workspace) -> Result<()> {
        if !self.force {
            let done = ws.store().snapshot().await?.current_week();
            if done > 0 {
                bail!(
                    "{} already has {done} scheduled week(s); pass --force to start over",
                    ws.dir().display()
                );
            }
        }

        let roster = ws.roster()?;
        let contract = ws.config()?.derive_contract(&roster)?;
        let scheduler = ws.scheduler_with(contract.clone())?;
        scheduler.reset().await?;
        ws.write_contract(&contract)?;

        println!(
            "wrote {CONTRACT_FILE}: {} people, {} cleanups, {} slots/week, {} weeks",
            roster.len(),
            contract.cleanups.len(),
            contract.total_slots(),
            contract.num_weeks
        );
        Ok(())
    }
}
