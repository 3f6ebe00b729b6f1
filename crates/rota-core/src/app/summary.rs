//! Summary - 学期全体の集計レポート
//!
//! Checkpoint から人ごとの担当回数を集計し、ルール違反の兆候を並べます。
//! - illegal: 資格のない掃除への割り当て（台帳を手で編集した場合など）
//! - deviations: 基準回数から 2 回以上ずれている人

use std::fmt::Write as _;

use serde::Serialize;

use crate::domain::{Checkpoint, CleanupName, Group, PersonName, QuotaContract, Roster};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub weeks: u32,
    /// Column order for `PersonTally::counts`.
    pub cleanups: Vec<CleanupName>,
    pub people: Vec<PersonTally>,
    pub illegal: Vec<IllegalAssignment>,
    pub deviations: Vec<Deviation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonTally {
    pub person: PersonName,
    pub group: Group,
    pub counts: Vec<u32>,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IllegalReason {
    /// Person is on the roster but not eligible for the cleanup.
    NotEligible,
    /// Person appears in the history but not on the roster.
    UnknownPerson,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IllegalAssignment {
    pub week: u32,
    pub person: PersonName,
    pub cleanup: CleanupName,
    pub reason: IllegalReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deviation {
    pub person: PersonName,
    pub cleanup: CleanupName,
    pub assigned: u32,
    pub base: u32,
}

impl Summary {
    pub fn compute(checkpoint: &Checkpoint, roster: &Roster, contract: &QuotaContract) -> Self {
        let cleanups: Vec<CleanupName> = contract.cleanups.iter().map(|c| c.name.clone()).collect();

        let people = roster
            .members()
            .iter()
            .map(|member| {
                let counts: Vec<u32> = cleanups
                    .iter()
                    .map(|c| checkpoint.count(member.name.as_str(), c.as_str()))
                    .collect();
                PersonTally {
                    person: member.name.clone(),
                    group: member.group,
                    total: counts.iter().sum(),
                    counts,
                }
            })
            .collect();

        let mut illegal = Vec::new();
        for (week, assignment) in checkpoint.weekly_history() {
            for (person, cleanup) in assignment {
                let reason = match roster.get(person.as_str()) {
                    None => IllegalReason::UnknownPerson,
                    Some(member) if !contract.allowed(member).contains(cleanup) => {
                        IllegalReason::NotEligible
                    }
                    Some(_) => continue,
                };
                illegal.push(IllegalAssignment {
                    week: *week,
                    person: person.clone(),
                    cleanup: cleanup.clone(),
                    reason,
                });
            }
        }

        // rotation-class people follow the cursor, not a base quota
        let mut deviations = Vec::new();
        for member in roster.members().iter().filter(|m| !contract.rotates(m)) {
            let Some(base) = contract.base_for(member.group) else {
                continue;
            };
            for (cleanup, quota) in base {
                let assigned = checkpoint.count(member.name.as_str(), cleanup.as_str());
                if assigned.abs_diff(*quota) > 1 {
                    deviations.push(Deviation {
                        person: member.name.clone(),
                        cleanup: cleanup.clone(),
                        assigned,
                        base: *quota,
                    });
                }
            }
        }

        Self {
            weeks: checkpoint.current_week(),
            cleanups,
            people,
            illegal,
            deviations,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.illegal.is_empty() && self.deviations.is_empty()
    }

    /// Plain-text table for the terminal.
    pub fn render(&self) -> String {
        let name_width = self
            .people
            .iter()
            .map(|p| p.person.as_str().len())
            .chain(std::iter::once("person".len()))
            .max()
            .unwrap_or(6);
        let widths: Vec<usize> = self.cleanups.iter().map(|c| c.as_str().len().max(3)).collect();

        let mut out = String::new();
        let _ = writeln!(out, "weeks scheduled: {}", self.weeks);
        let _ = write!(out, "{:<name_width$}  {:<12}", "person", "group");
        for (cleanup, &width) in self.cleanups.iter().zip(&widths) {
            let _ = write!(out, " {:>width$}", cleanup.as_str());
        }
        let _ = writeln!(out, " {:>5}", "total");

        for tally in &self.people {
            let _ = write!(
                out,
                "{:<name_width$}  {:<12}",
                tally.person.as_str(),
                tally.group.as_str()
            );
            for (count, &width) in tally.counts.iter().zip(&widths) {
                let _ = write!(out, " {count:>width$}");
            }
            let _ = writeln!(out, " {:>5}", tally.total);
        }

        if !self.illegal.is_empty() {
            let _ = writeln!(out, "\nillegal assignments:");
            for i in &self.illegal {
                let _ = writeln!(
                    out,
                    "  week {}: {} -> {} ({:?})",
                    i.week, i.person, i.cleanup, i.reason
                );
            }
        }
        if !self.deviations.is_empty() {
            let _ = writeln!(out, "\ndeviations from base (more than 1):");
            for d in &self.deviations {
                let _ = writeln!(
                    out,
                    "  {} {}: assigned {}, base {}",
                    d.person, d.cleanup, d.assigned, d.base
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::fixtures;
    use crate::domain::{AssignerPolicy, WeekAssignment, WeekDelta};

    fn one_week(pairs: &[(&str, &str)]) -> Checkpoint {
        let assignment: WeekAssignment = pairs
            .iter()
            .map(|(p, c)| ((*p).into(), (*c).into()))
            .collect();
        Checkpoint::empty()
            .apply(&WeekDelta {
                week: 1,
                assignment,
                cursor_advance: 1,
            })
            .unwrap()
    }

    #[test]
    fn tallies_follow_contract_order() {
        let contract = fixtures::contract(AssignerPolicy::default());
        let roster = fixtures::roster();
        let checkpoint = one_week(&[("p00", "B"), ("p01", "A")]);
        let summary = Summary::compute(&checkpoint, &roster, &contract);

        assert_eq!(summary.weeks, 1);
        assert_eq!(summary.people.len(), 10);
        assert_eq!(summary.people[0].counts, [0, 1, 0, 0, 0, 0, 0]);
        assert_eq!(summary.people[0].total, 1);
        assert!(summary.render().contains("p00"));
    }

    #[test]
    fn ineligible_and_unknown_people_are_flagged() {
        let contract = fixtures::contract(AssignerPolicy::default());
        let roster = fixtures::roster();
        // p00 is second deck and has no base for G
        let checkpoint = one_week(&[("p00", "G"), ("ghost", "A"), ("p03", "G")]);
        let summary = Summary::compute(&checkpoint, &roster, &contract);

        let reasons: Vec<(&str, IllegalReason)> = summary
            .illegal
            .iter()
            .map(|i| (i.person.as_str(), i.reason))
            .collect();
        assert_eq!(
            reasons,
            [
                ("ghost", IllegalReason::UnknownPerson),
                ("p00", IllegalReason::NotEligible),
            ]
        );
        assert!(!summary.is_clean());
    }

    #[test]
    fn deviation_needs_a_gap_of_two() {
        let mut contract = fixtures::contract(AssignerPolicy::default());
        contract.bases.insert(Group::SecondDeck, fixtures::base(&[("A", 1), ("B", 2)]));
        let roster = fixtures::roster();
        let checkpoint = one_week(&[("p00", "A")]);
        let summary = Summary::compute(&checkpoint, &roster, &contract);

        let p00: Vec<(&str, u32, u32)> = summary
            .deviations
            .iter()
            .filter(|d| d.person.as_str() == "p00")
            .map(|d| (d.cleanup.as_str(), d.assigned, d.base))
            .collect();
        assert_eq!(p00, [("B", 0, 2)]);
        // rotation member p09 is never reported
        assert!(summary.deviations.iter().all(|d| d.person.as_str() != "p09"));
    }
}
