//! Candidate filtering and ranking for a single cleanup.

use std::cmp::{Ordering, Reverse};

use rand::Rng;

use crate::domain::{BaseQuota, Checkpoint, CleanupSpec, Member, PlacementKind};

/// Relaxation ladder. Each tier admits only the people the previous tiers
/// excluded, so a person is ranked at most once per cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tier {
    /// Eligibility, base+1 cap and no-repeat all hold.
    Strict,
    /// Under cap but would repeat last week's cleanup.
    NoRepeat,
    /// At or over cap.
    HardCap,
}

impl Tier {
    pub(crate) const LADDER: [Tier; 3] = [Tier::Strict, Tier::NoRepeat, Tier::HardCap];

    pub(crate) fn kind(self) -> PlacementKind {
        match self {
            Tier::Strict => PlacementKind::Normal,
            Tier::NoRepeat => PlacementKind::RelaxedNoRepeat,
            Tier::HardCap => PlacementKind::RelaxedHardCap,
        }
    }
}

/// Where a person stands against one cleanup at the start of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Standing {
    pub assigned: u32,
    pub base: u32,
    pub repeats: bool,
}

impl Standing {
    pub(crate) fn under_cap(self) -> bool {
        self.assigned < self.base + 1
    }

    pub(crate) fn deficit(self) -> i64 {
        i64::from(self.base) - i64::from(self.assigned)
    }

    /// Which tier first admits this person.
    pub(crate) fn tier(self) -> Tier {
        if !self.under_cap() {
            Tier::HardCap
        } else if self.repeats {
            Tier::NoRepeat
        } else {
            Tier::Strict
        }
    }
}

/// Sort key, compared highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Priority {
    /// Never done this cleanup while the bootstrap window is open.
    pub coverage: bool,
    /// base - assigned; zeroed for coverage and relaxed candidates.
    pub deficit: i64,
    /// Fewer remaining options ranks higher.
    pub flexibility: Reverse<usize>,
    pub draw: u64,
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.coverage, self.deficit, self.flexibility, self.draw).cmp(&(
            other.coverage,
            other.deficit,
            other.flexibility,
            other.draw,
        ))
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Candidate<'a> {
    pub member: &'a Member,
    pub priority: Priority,
}

impl Candidate<'_> {
    pub(crate) fn is_external(&self) -> bool {
        self.member.group.is_external()
    }
}

/// Count of eligible cleanups still under the base+1 cap.
pub(crate) fn flexibility(checkpoint: &Checkpoint, member: &Member, base: &BaseQuota) -> usize {
    base.iter()
        .filter(|(cleanup, quota)| checkpoint.count(member.name.as_str(), cleanup.as_str()) < **quota + 1)
        .count()
}

pub(crate) fn standing(
    checkpoint: &Checkpoint,
    member: &Member,
    base: &BaseQuota,
    spec: &CleanupSpec,
) -> Option<Standing> {
    let quota = *base.get(spec.name.as_str())?;
    let repeats = spec.no_repeat
        && checkpoint
            .last_cleanup(member.name.as_str())
            .is_some_and(|last| *last == spec.name);
    Some(Standing {
        assigned: checkpoint.count(member.name.as_str(), spec.name.as_str()),
        base: quota,
        repeats,
    })
}

pub(crate) fn priority<R: Rng + ?Sized>(
    tier: Tier,
    standing: Standing,
    coverage_open: bool,
    flexibility: usize,
    rng: &mut R,
) -> Priority {
    let coverage = tier == Tier::Strict && coverage_open && standing.assigned == 0;
    let deficit = if tier == Tier::Strict && !coverage {
        standing.deficit()
    } else {
        0
    };
    Priority {
        coverage,
        deficit,
        flexibility: Reverse(flexibility),
        draw: rng.r#gen(),
    }
}

/// Best first.
pub(crate) fn rank(candidates: &mut [Candidate<'_>]) {
    candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
}
