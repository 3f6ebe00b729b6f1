//! Weekly assigner: one complete person -> cleanup mapping per call.
//!
//! Design intent:
//! - Pure: reads the checkpoint, returns a `WeekPlan`; committing is the store's job.
//! - Total: once the contract is valid for the roster, every person is placed.
//!   Placements that bent a rule carry a `PlacementKind` and are logged at warn.
//! - The only nondeterminism is the injected `Rng`.
//!
//! Flow:
//! 1. rotation class (if enabled) placed from the round-robin cursor;
//! 2. everyone else shuffled, cleanups visited in shuffled order;
//! 3. per cleanup, tiers of the relaxation ladder fill the open slots;
//! 4. anyone left goes to their least-crowded allowed cleanup.

mod balance;
mod candidate;
mod rotation;

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::domain::{
    Checkpoint, CleanupName, CleanupSpec, Member, Placement, PlacementKind, QuotaContract,
    RotaError, Roster, StateError, WeekPlan,
};

use balance::Tally;
use candidate::{Candidate, Tier};

/// Plan the week after `checkpoint.current_week()`.
pub fn plan_next_week<R: Rng + ?Sized>(
    checkpoint: &Checkpoint,
    roster: &Roster,
    contract: &QuotaContract,
    rng: &mut R,
) -> Result<WeekPlan, RotaError> {
    plan_week(checkpoint, roster, contract, checkpoint.next_week(), rng)
}

/// Plan `week`, which must directly follow the checkpoint.
pub fn plan_week<R: Rng + ?Sized>(
    checkpoint: &Checkpoint,
    roster: &Roster,
    contract: &QuotaContract,
    week: u32,
    rng: &mut R,
) -> Result<WeekPlan, RotaError> {
    if week != checkpoint.next_week() {
        return Err(StateError::OutOfSequence {
            expected: checkpoint.next_week(),
            got: week,
        }
        .into());
    }
    contract.validate_for(roster)?;

    let mut board = Board::new(week);

    if contract.policy.rotation_class {
        for (member, cleanup) in
            rotation::picks(roster, &contract.rotation, checkpoint.round_robin_index())
        {
            // the cursor alone cannot avoid a repeat when the list has one entry
            let repeats = contract.is_no_repeat(cleanup.as_str())
                && checkpoint.last_cleanup(member.name.as_str()) == Some(&cleanup);
            let kind = if repeats {
                PlacementKind::RelaxedNoRepeat
            } else {
                PlacementKind::Rotation
            };
            board.place(member, cleanup, kind);
        }
    }

    let mut pool: Vec<&Member> = roster
        .members()
        .iter()
        .filter(|m| !board.is_placed(m))
        .collect();
    pool.shuffle(rng);

    let flexibility: HashMap<&str, usize> = pool
        .iter()
        .filter_map(|m| {
            let base = contract.base_for(m.group)?;
            Some((m.name.as_str(), candidate::flexibility(checkpoint, m, base)))
        })
        .collect();

    let coverage_open = contract.policy.coverage_milestone && week <= contract.bootstrap_weeks;

    let mut order: Vec<&CleanupSpec> = contract.cleanups.iter().collect();
    order.shuffle(rng);

    for spec in order {
        let mut open = (spec.slots as usize).saturating_sub(board.headcount(&spec.name));
        for tier in Tier::LADDER {
            if open == 0 {
                break;
            }
            let mut candidates: Vec<Candidate<'_>> = pool
                .iter()
                .copied()
                .filter(|m| !board.is_placed(m))
                .filter_map(|member| {
                    let base = contract.base_for(member.group)?;
                    let standing = candidate::standing(checkpoint, member, base, spec)?;
                    if standing.tier() != tier {
                        return None;
                    }
                    let flex = flexibility.get(member.name.as_str()).copied().unwrap_or(0);
                    Some(Candidate {
                        member,
                        priority: candidate::priority(tier, standing, coverage_open, flex, rng),
                    })
                })
                .collect();
            if candidates.is_empty() {
                continue;
            }
            candidate::rank(&mut candidates);

            let chosen = balance::select(
                candidates,
                open,
                spec.slots,
                board.tally(&spec.name),
                contract.policy.population_balance,
            );
            open -= chosen.len();
            for c in chosen {
                board.place(c.member, spec.name.clone(), tier.kind());
            }
        }
        tracing::debug!(
            week,
            cleanup = %spec.name,
            slots = spec.slots,
            filled = board.headcount(&spec.name),
            "cleanup filled"
        );
    }

    for member in pool {
        if board.is_placed(member) {
            continue;
        }
        if let Some(cleanup) = fallback(checkpoint, contract, member, &board) {
            board.place(member, cleanup, PlacementKind::Forced);
        }
    }

    debug_assert_eq!(board.placements.len(), roster.len());
    Ok(board.finish())
}

/// Least-crowded allowed cleanup, preferring ones still under the base+1 cap.
/// Ties go to the first in contract order.
fn fallback(
    checkpoint: &Checkpoint,
    contract: &QuotaContract,
    member: &Member,
    board: &Board,
) -> Option<CleanupName> {
    let allowed = contract.allowed(member);
    let base = contract.base_for(member.group);
    let under_cap: Vec<&CleanupName> = allowed
        .iter()
        .filter(|c| {
            base.and_then(|b| b.get(c.as_str()))
                .is_some_and(|quota| checkpoint.count(member.name.as_str(), c.as_str()) < quota + 1)
        })
        .collect();
    let choices: Vec<&CleanupName> = if under_cap.is_empty() {
        allowed.iter().collect()
    } else {
        under_cap
    };
    choices
        .into_iter()
        .min_by_key(|c| board.headcount(c))
        .cloned()
}

/// Working state while a week is being filled.
struct Board<'a> {
    week: u32,
    placed: HashSet<&'a str>,
    tallies: HashMap<CleanupName, Tally>,
    placements: Vec<Placement>,
}

impl<'a> Board<'a> {
    fn new(week: u32) -> Self {
        Self {
            week,
            placed: HashSet::new(),
            tallies: HashMap::new(),
            placements: Vec::new(),
        }
    }

    fn is_placed(&self, member: &Member) -> bool {
        self.placed.contains(member.name.as_str())
    }

    fn tally(&self, cleanup: &CleanupName) -> Tally {
        self.tallies.get(cleanup).copied().unwrap_or_default()
    }

    fn headcount(&self, cleanup: &CleanupName) -> usize {
        let tally = self.tally(cleanup);
        (tally.internal + tally.external) as usize
    }

    fn place(&mut self, member: &'a Member, cleanup: CleanupName, kind: PlacementKind) {
        match kind {
            PlacementKind::Forced => tracing::warn!(
                week = self.week,
                person = %member.name,
                cleanup = %cleanup,
                "last-resort placement"
            ),
            kind if kind.is_degraded() => tracing::warn!(
                week = self.week,
                person = %member.name,
                cleanup = %cleanup,
                ?kind,
                "relaxed placement"
            ),
            _ => {}
        }
        self.placed.insert(member.name.as_str());
        self.tallies
            .entry(cleanup.clone())
            .or_default()
            .record(member.group.is_external());
        self.placements.push(Placement {
            person: member.name.clone(),
            cleanup,
            kind,
        });
    }

    fn finish(self) -> WeekPlan {
        WeekPlan {
            week: self.week,
            placements: self.placements,
        }
    }
}
