//! Week plan: the assigner's output before anything is committed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::names::{CleanupName, PersonName};

/// One week's person -> cleanup mapping.
pub type WeekAssignment = BTreeMap<PersonName, CleanupName>;

/// How a placement was reached. Everything except `Normal` and `Rotation`
/// bent a constraint and is logged at warn level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    /// All constraints held.
    Normal,
    /// Chosen by the round-robin cursor.
    Rotation,
    /// Admitted after dropping the no-repeat rule.
    RelaxedNoRepeat,
    /// Admitted after dropping the base+1 cap.
    RelaxedHardCap,
    /// Last-resort placement after every slot was taken.
    Forced,
}

impl PlacementKind {
    pub fn is_degraded(self) -> bool {
        !matches!(self, PlacementKind::Normal | PlacementKind::Rotation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub person: PersonName,
    pub cleanup: CleanupName,
    pub kind: PlacementKind,
}

/// State change implied by a plan. Applied by `Checkpoint::apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekDelta {
    pub week: u32,
    pub assignment: WeekAssignment,
    pub cursor_advance: u32,
}

/// Complete assignment for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekPlan {
    pub week: u32,
    /// In placement order.
    pub placements: Vec<Placement>,
}

impl WeekPlan {
    pub fn assignment(&self) -> WeekAssignment {
        self.placements
            .iter()
            .map(|p| (p.person.clone(), p.cleanup.clone()))
            .collect()
    }

    pub fn delta(&self) -> WeekDelta {
        WeekDelta {
            week: self.week,
            assignment: self.assignment(),
            cursor_advance: 1,
        }
    }

    pub fn placement(&self, person: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.person.as_str() == person)
    }

    pub fn degraded(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|p| p.kind.is_degraded())
    }
}
