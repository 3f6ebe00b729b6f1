//! Checkpoint: the durable scheduling state.
//!
//! Design:
//! - Every mutation returns a new `Checkpoint`; the caller persists it whole.
//! - Canonical form: no zero counts, no person entry without data. A rebuilt
//!   checkpoint therefore compares equal to one grown week by week.
//! - `round_robin_index` advances once per committed week.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::StateError;
use super::names::{CleanupName, PersonName};
use super::plan::{WeekAssignment, WeekDelta};

pub type Counts = BTreeMap<PersonName, BTreeMap<CleanupName, u32>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Checkpoint {
    current_week: u32,
    #[serde(default)]
    assigned_so_far: Counts,
    #[serde(default)]
    last_cleanup: BTreeMap<PersonName, CleanupName>,
    #[serde(default)]
    weekly_history: BTreeMap<u32, WeekAssignment>,
    #[serde(default)]
    round_robin_index: u32,
}

impl Checkpoint {
    /// State at semester start.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn current_week(&self) -> u32 {
        self.current_week
    }

    pub fn next_week(&self) -> u32 {
        self.current_week + 1
    }

    pub fn round_robin_index(&self) -> u32 {
        self.round_robin_index
    }

    pub fn assigned_so_far(&self) -> &Counts {
        &self.assigned_so_far
    }

    pub fn weekly_history(&self) -> &BTreeMap<u32, WeekAssignment> {
        &self.weekly_history
    }

    pub fn week(&self, week: u32) -> Option<&WeekAssignment> {
        self.weekly_history.get(&week)
    }

    pub fn count(&self, person: &str, cleanup: &str) -> u32 {
        self.assigned_so_far
            .get(person)
            .and_then(|m| m.get(cleanup))
            .copied()
            .unwrap_or(0)
    }

    pub fn last_cleanup(&self, person: &str) -> Option<&CleanupName> {
        self.last_cleanup.get(person)
    }

    /// Apply one week's delta. The week must directly follow `current_week`.
    pub fn apply(&self, delta: &WeekDelta) -> Result<Checkpoint, StateError> {
        let expected = self.next_week();
        if delta.week != expected {
            return Err(StateError::OutOfSequence {
                expected,
                got: delta.week,
            });
        }

        let mut next = self.clone();
        for (person, cleanup) in &delta.assignment {
            *next
                .assigned_so_far
                .entry(person.clone())
                .or_default()
                .entry(cleanup.clone())
                .or_insert(0) += 1;
            next.last_cleanup.insert(person.clone(), cleanup.clone());
        }
        next.weekly_history
            .insert(delta.week, delta.assignment.clone());
        next.current_week = delta.week;
        next.round_robin_index += delta.cursor_advance;
        Ok(next)
    }

    /// Undo the most recent week.
    pub fn rollback(&self) -> Result<Checkpoint, StateError> {
        if self.current_week == 0 {
            return Err(StateError::NothingToRollback);
        }
        let mut next = self.clone();
        let Some(removed) = next.weekly_history.remove(&self.current_week) else {
            return Err(StateError::HistoryGap {
                expected: self.current_week,
                found: self
                    .weekly_history
                    .keys()
                    .next_back()
                    .copied()
                    .unwrap_or(0),
            });
        };

        for (person, cleanup) in &removed {
            if let Some(counts) = next.assigned_so_far.get_mut(person) {
                if let Some(n) = counts.get_mut(cleanup) {
                    *n = n.saturating_sub(1);
                    if *n == 0 {
                        counts.remove(cleanup);
                    }
                }
                if counts.is_empty() {
                    next.assigned_so_far.remove(person);
                }
            }
        }

        next.current_week -= 1;
        next.round_robin_index = next.round_robin_index.saturating_sub(1);

        // A person's previous cleanup may sit several weeks back (sparse rows),
        // so rescan instead of subtracting.
        next.last_cleanup = last_cleanups(&next.weekly_history);
        Ok(next)
    }

    /// Rebuild from a complete, contiguous history.
    pub fn from_history(history: BTreeMap<u32, WeekAssignment>) -> Result<Checkpoint, StateError> {
        let mut checkpoint = Checkpoint::empty();
        for (week, assignment) in history {
            if week != checkpoint.next_week() {
                return Err(StateError::HistoryGap {
                    expected: checkpoint.next_week(),
                    found: week,
                });
            }
            checkpoint = checkpoint.apply(&WeekDelta {
                week,
                assignment,
                cursor_advance: 1,
            })?;
        }
        Ok(checkpoint)
    }

    /// History keys must be exactly `1..=current_week`.
    pub fn check_continuity(&self) -> Result<(), StateError> {
        let mut expected = 1;
        for &week in self.weekly_history.keys() {
            if week != expected {
                return Err(StateError::HistoryGap {
                    expected,
                    found: week,
                });
            }
            expected += 1;
        }
        if expected != self.next_week() {
            return Err(StateError::HistoryGap {
                expected,
                found: self.current_week,
            });
        }
        Ok(())
    }

    /// Check that the derived fields agree with the history they came from.
    pub fn verify(&self) -> Result<(), StateError> {
        self.check_continuity()?;
        let rebuilt = Checkpoint::from_history(self.weekly_history.clone())?;
        match self.first_difference(&rebuilt) {
            None => Ok(()),
            Some(detail) => Err(StateError::Diverged {
                source_name: "its own history",
                detail,
            }),
        }
    }

    /// Human-readable description of the first field that differs.
    pub fn first_difference(&self, other: &Checkpoint) -> Option<String> {
        if self.current_week != other.current_week {
            return Some(format!(
                "current_week {} vs {}",
                self.current_week, other.current_week
            ));
        }
        if self.round_robin_index != other.round_robin_index {
            return Some(format!(
                "round_robin_index {} vs {}",
                self.round_robin_index, other.round_robin_index
            ));
        }
        if let Some(week) = diff_key(&self.weekly_history, &other.weekly_history) {
            return Some(format!("weekly_history differs at week {week}"));
        }
        if let Some(person) = diff_key(&self.assigned_so_far, &other.assigned_so_far) {
            return Some(format!("assigned_so_far differs for `{person}`"));
        }
        if let Some(person) = diff_key(&self.last_cleanup, &other.last_cleanup) {
            return Some(format!("last_cleanup differs for `{person}`"));
        }
        None
    }
}

/// Most recent cleanup per person, scanning weeks newest first.
fn last_cleanups(history: &BTreeMap<u32, WeekAssignment>) -> BTreeMap<PersonName, CleanupName> {
    let mut last = BTreeMap::new();
    for assignment in history.values().rev() {
        for (person, cleanup) in assignment {
            last.entry(person.clone()).or_insert_with(|| cleanup.clone());
        }
    }
    last
}

fn diff_key<'a, K: Ord, V: PartialEq>(
    left: &'a BTreeMap<K, V>,
    right: &'a BTreeMap<K, V>,
) -> Option<&'a K> {
    left.iter()
        .find(|(k, v)| right.get(*k) != Some(*v))
        .map(|(k, _)| k)
        .or_else(|| right.keys().find(|k| !left.contains_key(*k)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn week(pairs: &[(&str, &str)]) -> WeekAssignment {
        pairs
            .iter()
            .map(|(p, c)| (PersonName::from(*p), CleanupName::from(*c)))
            .collect()
    }

    fn delta(n: u32, pairs: &[(&str, &str)]) -> WeekDelta {
        WeekDelta {
            week: n,
            assignment: week(pairs),
            cursor_advance: 1,
        }
    }

    fn three_weeks() -> Checkpoint {
        let mut cp = Checkpoint::empty();
        cp = cp.apply(&delta(1, &[("alice", "kitchen"), ("bob", "stairs")])).unwrap();
        cp = cp.apply(&delta(2, &[("alice", "stairs"), ("bob", "kitchen")])).unwrap();
        // bob has no cell in week 3
        cp = cp.apply(&delta(3, &[("alice", "deck_0")])).unwrap();
        cp
    }

    #[test]
    fn apply_updates_all_fields_together() {
        let cp = three_weeks();
        assert_eq!(cp.current_week(), 3);
        assert_eq!(cp.round_robin_index(), 3);
        assert_eq!(cp.count("alice", "kitchen"), 1);
        assert_eq!(cp.count("bob", "kitchen"), 1);
        assert_eq!(cp.last_cleanup("alice").map(|c| c.as_str()), Some("deck_0"));
        assert_eq!(cp.last_cleanup("bob").map(|c| c.as_str()), Some("kitchen"));
        assert_eq!(cp.weekly_history().len(), 3);
    }

    #[rstest]
    #[case::skip(5)]
    #[case::duplicate(3)]
    #[case::zero(0)]
    fn apply_rejects_out_of_sequence_week(#[case] n: u32) {
        let cp = three_weeks();
        let err = cp.apply(&delta(n, &[("alice", "kitchen")])).unwrap_err();
        assert_eq!(err, StateError::OutOfSequence { expected: 4, got: n });
    }

    #[test]
    fn rollback_restores_previous_state_exactly() {
        let before = three_weeks();
        let after = before
            .apply(&delta(4, &[("alice", "kitchen"), ("bob", "deck_0")]))
            .unwrap();
        assert_eq!(after.rollback().unwrap(), before);
    }

    #[test]
    fn rollback_rescans_last_cleanup() {
        let cp = three_weeks().rollback().unwrap();
        // alice's previous cleanup differs from the removed one
        assert_eq!(cp.last_cleanup("alice").map(|c| c.as_str()), Some("stairs"));
        assert_eq!(cp.count("alice", "deck_0"), 0);
        assert!(!cp.assigned_so_far()["alice"].contains_key("deck_0"));

        let cp = cp.rollback().unwrap().rollback().unwrap();
        assert_eq!(cp, Checkpoint::empty());
    }

    #[test]
    fn rollback_without_history_fails() {
        assert_eq!(
            Checkpoint::empty().rollback(),
            Err(StateError::NothingToRollback)
        );
    }

    #[test]
    fn from_history_matches_incremental() {
        let incremental = three_weeks();
        let rebuilt = Checkpoint::from_history(incremental.weekly_history().clone()).unwrap();
        assert_eq!(rebuilt, incremental);
        assert!(incremental.verify().is_ok());
    }

    #[test]
    fn from_history_rejects_gaps() {
        let mut history = three_weeks().weekly_history().clone();
        history.remove(&2);
        assert_eq!(
            Checkpoint::from_history(history),
            Err(StateError::HistoryGap {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn verify_detects_tampered_counts() {
        let cp = three_weeks();
        let mut value = serde_json::to_value(&cp).unwrap();
        value["assigned_so_far"]["alice"]["kitchen"] = serde_json::json!(7);
        let tampered: Checkpoint = serde_json::from_value(value).unwrap();
        assert!(matches!(
            tampered.verify(),
            Err(StateError::Diverged { ref detail, .. }) if detail.contains("alice")
        ));
    }

    #[rstest]
    #[case::history_missing(r#"{"current_week": 3}"#, 1, 3)]
    #[case::hole(r#"{"current_week": 2, "weekly_history": {"2": {}}}"#, 1, 2)]
    #[case::history_ahead(r#"{"current_week": 1, "weekly_history": {"1": {}, "2": {}}}"#, 3, 1)]
    fn hand_written_gaps_are_reported(#[case] json: &str, #[case] expected: u32, #[case] found: u32) {
        let cp: Checkpoint = serde_json::from_str(json).unwrap();
        assert_eq!(
            cp.check_continuity(),
            Err(StateError::HistoryGap { expected, found })
        );
        assert!(cp.verify().is_err());
    }

    #[test]
    fn serializes_with_documented_field_names() {
        let value = serde_json::to_value(three_weeks()).unwrap();
        for field in [
            "current_week",
            "assigned_so_far",
            "last_cleanup",
            "weekly_history",
            "round_robin_index",
        ] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert_eq!(value["weekly_history"]["2"]["bob"], "kitchen");
    }
}
