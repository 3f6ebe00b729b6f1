//! `rota schedule`

use anyhow::Result;
use clap::Args;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rota_core::domain::{CleanupName, PersonName, PlacementKind, WeekAssignment, WeekPlan};

use crate::workspace::Workspace;

#[derive(Debug, Args)]
pub struct ScheduleCommand {
    /// Number of weeks to assign.
    #[arg(long, default_value_t = 1, conflicts_with = "all")]
    weeks: u32,

    /// Assign every remaining week of the semester.
    #[arg(long)]
    all: bool,

    /// Seed for reproducible assignments.
    #[arg(long)]
    seed: Option<u64>,
}

impl ScheduleCommand {
    pub async fn run(self, ws: &Workspace) -> Result<()> {
        let scheduler = ws.scheduler()?;
        tracing::debug!(dir = %ws.dir().display(), seed = ?self.seed, "scheduling");
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let plans = if self.all {
            scheduler.run_remaining(&mut rng).await?
        } else if self.weeks == 1 {
            // a single week past the end is an error, not a silent no-op
            vec![scheduler.run_next_week(&mut rng).await?]
        } else {
            scheduler.run_weeks(self.weeks, &mut rng).await?
        };

        if plans.is_empty() {
            println!("nothing to schedule: semester complete");
        }
        for plan in &plans {
            print!("{}", render_plan(plan));
        }
        Ok(())
    }
}

fn marker(kind: PlacementKind) -> &'static str {
    match kind {
        PlacementKind::Normal => "",
        PlacementKind::Rotation => " (rotation)",
        PlacementKind::RelaxedNoRepeat => " (repeat allowed)",
        PlacementKind::RelaxedHardCap => " (over cap)",
        PlacementKind::Forced => " (forced)",
    }
}

/// One line per person, sorted by cleanup then person.
pub(crate) fn render_plan(plan: &WeekPlan) -> String {
    let rows = plan
        .placements
        .iter()
        .map(|p| (&p.cleanup, &p.person, marker(p.kind)))
        .collect();
    render_rows(plan.week, rows)
}

/// A committed week. Placement kinds are not persisted, so no markers.
pub(crate) fn render_assignment(week: u32, assignment: &WeekAssignment) -> String {
    let rows = assignment
        .iter()
        .map(|(person, cleanup)| (cleanup, person, ""))
        .collect();
    render_rows(week, rows)
}

fn render_rows(week: u32, mut rows: Vec<(&CleanupName, &PersonName, &str)>) -> String {
    rows.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    let width = rows.iter().map(|(c, _, _)| c.as_str().len()).max().unwrap_or(0);
    let mut out = format!("week {week}\n");
    for (cleanup, person, tag) in rows {
        out.push_str(&format!("  {:<width$}  {}{}\n", cleanup.as_str(), person, tag));
    }
    out
}
