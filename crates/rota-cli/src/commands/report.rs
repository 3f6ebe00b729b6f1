//! `rota summary`, `rota show`

use anyhow::{Result, bail};
use clap::Args;
use rota_core::Summary;

use super::schedule::render_assignment;
use crate::workspace::Workspace;

#[derive(Debug, Args)]
pub struct SummaryCommand {
    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl SummaryCommand {
    pub async fn run(self, ws: &Workspace) -> Result<()> {
        let scheduler = ws.scheduler()?;
        let checkpoint = scheduler.checkpoint().await?;
        let summary = Summary::compute(&checkpoint, scheduler.roster(), scheduler.contract());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print!("{}", summary.render());
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Only this week.
    #[arg(long)]
    week: Option<u32>,
}

impl ShowCommand {
    pub async fn run(self, ws: &Workspace) -> Result<()> {
        let checkpoint = ws.scheduler()?.checkpoint().await?;
        let history = checkpoint.weekly_history();

        let weeks: Vec<u32> = match self.week {
            Some(week) if !history.contains_key(&week) => {
                bail!("week {week} is not scheduled (last scheduled week: {})", checkpoint.current_week())
            }
            Some(week) => vec![week],
            None => history.keys().copied().collect(),
        };
        if weeks.is_empty() {
            println!("no weeks scheduled yet");
        }

        for week in weeks {
            print!("{}", render_assignment(week, &history[&week]));
        }
        Ok(())
    }
}
