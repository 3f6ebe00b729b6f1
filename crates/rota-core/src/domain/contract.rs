//! Quota contract: everything the weekly assigner reads but never writes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, RotaError};
use super::group::{AssignmentMode, Group};
use super::names::CleanupName;
use super::roster::{Member, Roster};

/// One cleanup type and its weekly demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupSpec {
    pub name: CleanupName,
    pub slots: u32,
    /// Forbid the same person doing this cleanup two weeks in a row.
    #[serde(default)]
    pub no_repeat: bool,
}

/// Behaviour switches for the assigner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignerPolicy {
    #[serde(default = "enabled")]
    pub coverage_milestone: bool,
    #[serde(default = "enabled")]
    pub rotation_class: bool,
    #[serde(default)]
    pub population_balance: bool,
}

fn enabled() -> bool {
    true
}

impl Default for AssignerPolicy {
    fn default() -> Self {
        Self {
            coverage_milestone: true,
            rotation_class: true,
            population_balance: false,
        }
    }
}

/// Base quota table for one group: cleanup -> target count over the horizon.
pub type BaseQuota = BTreeMap<CleanupName, u32>;

/// Read-only input to every scheduling step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaContract {
    /// Weeks in the horizon; scheduling stops once this many are committed.
    pub num_weeks: u32,
    /// Coverage milestone applies while `week <= bootstrap_weeks`.
    pub bootstrap_weeks: u32,
    /// Cleanup types in canonical order.
    pub cleanups: Vec<CleanupSpec>,
    pub bases: BTreeMap<Group, BaseQuota>,
    /// Allowed list for the rotation class, in rotation order.
    #[serde(default)]
    pub rotation: Vec<CleanupName>,
    #[serde(default)]
    pub policy: AssignerPolicy,
}

impl QuotaContract {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let contract: QuotaContract =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse {
                what: "quota contract",
                message: e.to_string(),
            })?;
        contract.validate()?;
        Ok(contract)
    }

    /// Shape checks that do not depend on who is on the roster.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cleanups.is_empty() {
            return Err(ConfigError::NoCleanups);
        }
        let mut known = BTreeSet::new();
        for spec in &self.cleanups {
            if spec.name.is_blank() {
                return Err(ConfigError::BlankCleanup);
            }
            if !known.insert(&spec.name) {
                return Err(ConfigError::DuplicateCleanup(spec.name.clone()));
            }
        }

        for (group, base) in &self.bases {
            if base.is_empty() {
                return Err(ConfigError::EmptyEligibility(group.to_string()));
            }
            for cleanup in base.keys() {
                if !known.contains(cleanup) {
                    return Err(ConfigError::UnknownCleanup {
                        context: format!("base quota for `{group}`"),
                        cleanup: cleanup.clone(),
                    });
                }
            }
        }

        for cleanup in &self.rotation {
            if !known.contains(cleanup) {
                return Err(ConfigError::UnknownCleanup {
                    context: "rotation list".to_string(),
                    cleanup: cleanup.clone(),
                });
            }
        }
        Ok(())
    }

    /// Checks that every group on the roster can actually be scheduled.
    pub fn validate_for(&self, roster: &Roster) -> Result<(), RotaError> {
        self.validate()?;
        for group in roster.groups() {
            let rotated = group.policy().mode == AssignmentMode::Rotation
                && self.policy.rotation_class;
            if rotated {
                if self.rotation.is_empty() {
                    return Err(ConfigError::EmptyEligibility(group.to_string()).into());
                }
            } else if !self.bases.contains_key(&group) {
                return Err(ConfigError::MissingGroup(group.to_string()).into());
            }
        }
        Ok(())
    }

    pub fn spec(&self, cleanup: &str) -> Option<&CleanupSpec> {
        self.cleanups.iter().find(|c| c.name.as_str() == cleanup)
    }

    pub fn is_no_repeat(&self, cleanup: &str) -> bool {
        self.spec(cleanup).is_some_and(|c| c.no_repeat)
    }

    pub fn base_for(&self, group: Group) -> Option<&BaseQuota> {
        self.bases.get(&group)
    }

    /// Whether this member is scheduled by the round-robin instead of quotas.
    pub fn rotates(&self, member: &Member) -> bool {
        self.policy.rotation_class && member.group.policy().mode == AssignmentMode::Rotation
    }

    /// Cleanups this member may ever be given, in contract order.
    pub fn allowed(&self, member: &Member) -> Vec<CleanupName> {
        if self.rotates(member) {
            return self.rotation.clone();
        }
        let Some(base) = self.bases.get(&member.group) else {
            return Vec::new();
        };
        self.cleanups
            .iter()
            .filter(|c| base.contains_key(&c.name))
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn total_slots(&self) -> u32 {
        self.cleanups.iter().map(|c| c.slots).sum()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Seven cleanups, slot counts {A:5,B:3,C:2,D:2,E:2,F:1,G:1}; A and C are no-repeat.
    pub fn seven_cleanups() -> Vec<CleanupSpec> {
        [
            ("A", 5, true),
            ("B", 3, false),
            ("C", 2, true),
            ("D", 2, false),
            ("E", 2, false),
            ("F", 1, false),
            ("G", 1, false),
        ]
        .into_iter()
        .map(|(name, slots, no_repeat)| CleanupSpec {
            name: name.into(),
            slots,
            no_repeat,
        })
        .collect()
    }

    pub fn base(pairs: &[(&str, u32)]) -> BaseQuota {
        pairs.iter().map(|(c, n)| (CleanupName::from(*c), *n)).collect()
    }

    /// F and G play the role of the two deck bathrooms.
    pub fn contract(policy: AssignerPolicy) -> QuotaContract {
        let everything = [
            ("A", 4),
            ("B", 2),
            ("C", 2),
            ("D", 2),
            ("E", 2),
            ("F", 1),
            ("G", 1),
        ];
        let mut bases = BTreeMap::new();
        bases.insert(Group::OutOfHouse, base(&everything));
        bases.insert(
            Group::SecondDeck,
            base(&[("A", 4), ("B", 2), ("C", 2), ("D", 2), ("E", 2), ("F", 2)]),
        );
        bases.insert(
            Group::ThirdDeck,
            base(&[("A", 4), ("B", 2), ("C", 2), ("D", 2), ("E", 2), ("G", 2)]),
        );
        bases.insert(Group::Rotation, base(&[("A", 6), ("B", 6)]));
        QuotaContract {
            num_weeks: 15,
            bootstrap_weeks: 10,
            cleanups: seven_cleanups(),
            bases,
            rotation: vec!["A".into(), "B".into()],
            policy,
        }
    }

    pub fn roster() -> Roster {
        let groups = [
            Group::SecondDeck,
            Group::SecondDeck,
            Group::SecondDeck,
            Group::ThirdDeck,
            Group::ThirdDeck,
            Group::ThirdDeck,
            Group::OutOfHouse,
            Group::OutOfHouse,
            Group::OutOfHouse,
            Group::Rotation,
        ];
        let members = groups
            .into_iter()
            .enumerate()
            .map(|(i, group)| Member {
                name: format!("p{i:02}").into(),
                group,
            })
            .collect();
        Roster::new(members).expect("fixture roster is valid")
    }
}
