//! Semester configuration (`rota.toml`) and quota derivation.
//!
//! Derivation turns minimum weekly demand plus the roster size into the
//! contract the assigner consumes:
//! 1. horizon length from the semester dates;
//! 2. weekly slot counts (spare people spread round-robin over cleanups);
//! 3. a global per-person base (largest-remainder apportionment);
//! 4. one base table per group (transfers for excluded cleanups).

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Deserialize;

use super::contract::{AssignerPolicy, BaseQuota, CleanupSpec, QuotaContract};
use super::errors::{ConfigError, RotaError};
use super::group::Group;
use super::names::CleanupName;
use super::roster::Roster;

const DEFAULT_BOOTSTRAP_WEEKS: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SemesterConfig {
    /// First day, `YYYY-MM-DD`.
    pub start: String,
    /// Last day (inclusive), `YYYY-MM-DD`.
    pub end: String,
    #[serde(default = "default_bootstrap_weeks")]
    pub bootstrap_weeks: u32,
    #[serde(rename = "cleanup")]
    pub cleanups: Vec<CleanupConfig>,
    /// Keyed by group tag; unknown tags are a config error.
    #[serde(default)]
    pub groups: BTreeMap<String, GroupConfig>,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub policy: AssignerPolicy,
}

fn default_bootstrap_weeks() -> u32 {
    DEFAULT_BOOTSTRAP_WEEKS
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanupConfig {
    pub name: CleanupName,
    pub min_per_week: u32,
    #[serde(default)]
    pub no_repeat: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    /// excluded cleanup -> cleanup that absorbs its quota
    #[serde(default)]
    pub transfer: BTreeMap<CleanupName, CleanupName>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RotationConfig {
    #[serde(default)]
    pub allowed: Vec<CleanupName>,
}

impl SemesterConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            what: "semester config",
            message: e.to_string(),
        })
    }

    /// `ceil(days / 7)`, both ends inclusive.
    pub fn num_weeks(&self) -> Result<u32, ConfigError> {
        let start = parse_date(&self.start)?;
        let end = parse_date(&self.end)?;
        if end < start {
            return Err(ConfigError::InvertedSemester {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }
        let days = (end - start).num_days() + 1;
        Ok(((days + 6) / 7) as u32)
    }

    pub fn derive_contract(&self, roster: &Roster) -> Result<QuotaContract, RotaError> {
        self.check_names()?;
        let num_weeks = self.num_weeks()?;
        let people = roster.len() as u32;

        let slots = weekly_slots(&self.cleanups, people);
        let global = global_base(&slots, num_weeks, people);

        let mut bases = BTreeMap::new();
        for group in Group::ALL {
            let base = match group {
                Group::Rotation => global
                    .iter()
                    .filter(|(c, _)| self.rotation.allowed.contains(*c))
                    .map(|(c, n)| (c.clone(), *n))
                    .collect(),
                _ => {
                    let mut base = global.clone();
                    if let Some(config) = self.groups.get(group.as_str()) {
                        apply_transfers(&mut base, &config.transfer);
                    }
                    base
                }
            };
            if !base.is_empty() {
                bases.insert(group, base);
            }
        }

        let contract = QuotaContract {
            num_weeks,
            bootstrap_weeks: self.bootstrap_weeks,
            cleanups: self
                .cleanups
                .iter()
                .zip(&slots)
                .map(|(config, (_, slots))| CleanupSpec {
                    name: config.name.clone(),
                    slots: *slots,
                    no_repeat: config.no_repeat,
                })
                .collect(),
            bases,
            rotation: self.rotation.allowed.clone(),
            policy: self.policy,
        };
        contract.validate_for(roster)?;

        tracing::info!(
            num_weeks,
            people,
            total_slots = contract.total_slots(),
            "derived quota contract"
        );
        if contract.total_slots() > people {
            tracing::warn!(
                total_slots = contract.total_slots(),
                people,
                "minimum weekly demand exceeds roster size; some slots will stay empty"
            );
        }
        Ok(contract)
    }

    fn check_names(&self) -> Result<(), ConfigError> {
        if self.cleanups.is_empty() {
            return Err(ConfigError::NoCleanups);
        }
        let mut known = BTreeSet::new();
        for cleanup in &self.cleanups {
            if cleanup.name.is_blank() {
                return Err(ConfigError::BlankCleanup);
            }
            if !known.insert(&cleanup.name) {
                return Err(ConfigError::DuplicateCleanup(cleanup.name.clone()));
            }
        }
        for (tag, config) in &self.groups {
            let group = tag
                .parse::<Group>()
                .map_err(|_| ConfigError::UnknownGroup(tag.clone()))?;
            for (from, to) in &config.transfer {
                for cleanup in [from, to] {
                    if !known.contains(cleanup) {
                        return Err(ConfigError::UnknownCleanup {
                            context: format!("transfer rule for `{group}`"),
                            cleanup: cleanup.clone(),
                        });
                    }
                }
            }
        }
        for cleanup in &self.rotation.allowed {
            if !known.contains(cleanup) {
                return Err(ConfigError::UnknownCleanup {
                    context: "rotation list".to_string(),
                    cleanup: cleanup.clone(),
                });
            }
        }
        Ok(())
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| ConfigError::InvalidDate {
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// Minimum demand plus spare people handed out one by one in cleanup order.
fn weekly_slots(cleanups: &[CleanupConfig], people: u32) -> Vec<(CleanupName, u32)> {
    let mut slots: Vec<(CleanupName, u32)> = cleanups
        .iter()
        .map(|c| (c.name.clone(), c.min_per_week))
        .collect();
    let minimum: u32 = slots.iter().map(|(_, n)| n).sum();
    let spare = people.saturating_sub(minimum) as usize;
    let len = slots.len();
    for i in 0..spare {
        slots[i % len].1 += 1;
    }
    slots
}

/// Per-person target over the horizon. Floors of `slots * weeks / people`,
/// then the remaining weeks go to the largest remainders (ties keep cleanup
/// order).
fn global_base(slots: &[(CleanupName, u32)], num_weeks: u32, people: u32) -> BaseQuota {
    if people == 0 {
        return slots.iter().map(|(c, _)| (c.clone(), 0)).collect();
    }
    let people = u64::from(people);
    let mut floors: Vec<(usize, u64, u64)> = slots
        .iter()
        .enumerate()
        .map(|(i, (_, n))| {
            let total = u64::from(*n) * u64::from(num_weeks);
            (i, total / people, total % people)
        })
        .collect();

    let assigned: u64 = floors.iter().map(|(_, f, _)| f).sum();
    let missing = u64::from(num_weeks).saturating_sub(assigned) as usize;

    let mut by_remainder: Vec<usize> = (0..floors.len()).collect();
    by_remainder.sort_by(|a, b| floors[*b].2.cmp(&floors[*a].2));
    for index in by_remainder.into_iter().take(missing) {
        floors[index].1 += 1;
    }

    floors
        .into_iter()
        .map(|(i, base, _)| (slots[i].0.clone(), base as u32))
        .collect()
}

fn apply_transfers(base: &mut BaseQuota, transfer: &BTreeMap<CleanupName, CleanupName>) {
    for (excluded, recipient) in transfer {
        if let Some(moved) = base.remove(excluded) {
            *base.entry(recipient.clone()).or_insert(0) += moved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::group::Group;
    use crate::domain::roster::Member;
    use rstest::rstest;

    const HOUSE: &str = r#"
        start = "2026-01-15"
        end = "2026-05-07"

        [[cleanup]]
        name = "deck_1"
        min_per_week = 1

        [[cleanup]]
        name = "deck_0"
        min_per_week = 3
        no_repeat = true

        [[cleanup]]
        name = "kitchen"
        min_per_week = 5
        no_repeat = true

        [[cleanup]]
        name = "stairs"
        min_per_week = 2

        [[cleanup]]
        name = "deck_brush"
        min_per_week = 2

        [[cleanup]]
        name = "bathroom_2"
        min_per_week = 2

        [[cleanup]]
        name = "bathroom_3"
        min_per_week = 2

        [groups.second_deck]
        transfer = { bathroom_3 = "bathroom_2" }

        [groups.third_deck]
        transfer = { bathroom_2 = "bathroom_3" }

        [rotation]
        allowed = ["kitchen", "deck_0"]
    "#;

    fn roster(n: usize) -> Roster {
        let groups = [Group::SecondDeck, Group::ThirdDeck, Group::OutOfHouse];
        Roster::new(
            (0..n)
                .map(|i| Member {
                    name: format!("member{i}").into(),
                    group: groups[i % groups.len()],
                })
                .collect(),
        )
        .unwrap()
    }

    #[rstest]
    #[case::spring("2026-01-15", "2026-05-07", 17)]
    #[case::one_day("2026-01-15", "2026-01-15", 1)]
    #[case::exactly_two_weeks("2026-01-01", "2026-01-14", 2)]
    #[case::two_weeks_and_a_day("2026-01-01", "2026-01-15", 3)]
    fn num_weeks_rounds_up(#[case] start: &str, #[case] end: &str, #[case] expected: u32) {
        let mut config = SemesterConfig::from_toml(HOUSE).unwrap();
        config.start = start.to_string();
        config.end = end.to_string();
        assert_eq!(config.num_weeks().unwrap(), expected);
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let mut config = SemesterConfig::from_toml(HOUSE).unwrap();
        config.end = "2025-12-01".to_string();
        assert!(matches!(
            config.num_weeks(),
            Err(ConfigError::InvertedSemester { .. })
        ));
    }

    #[test]
    fn spare_people_are_spread_in_cleanup_order() {
        let config = SemesterConfig::from_toml(HOUSE).unwrap();
        // minimum is 17; 20 people leave 3 spare
        let slots = weekly_slots(&config.cleanups, 20);
        let counts: Vec<u32> = slots.iter().map(|(_, n)| *n).collect();
        assert_eq!(counts, vec![2, 4, 6, 2, 2, 2, 2]);
    }

    #[test]
    fn global_base_sums_to_weeks() {
        let slots: Vec<(CleanupName, u32)> = vec![
            ("a".into(), 5),
            ("b".into(), 3),
            ("c".into(), 2),
        ];
        // exact: 5.0, 3.0, 2.0 for 10 weeks and 10 people
        let base = global_base(&slots, 10, 10);
        assert_eq!(base.values().sum::<u32>(), 10);

        // exact: 7.5, 4.5, 3.0 -> floors 7, 4, 3 (14), one more to the largest remainder
        let base = global_base(&slots, 15, 10);
        assert_eq!(base["a"], 8);
        assert_eq!(base["b"], 4);
        assert_eq!(base["c"], 3);
    }

    #[test]
    fn derive_applies_group_transfers() {
        let config = SemesterConfig::from_toml(HOUSE).unwrap();
        let roster = roster(20);
        let contract = config.derive_contract(&roster).unwrap();

        assert_eq!(contract.num_weeks, 17);
        assert_eq!(contract.bootstrap_weeks, 10);

        let global = &contract.bases[&Group::OutOfHouse];
        let second = &contract.bases[&Group::SecondDeck];
        let third = &contract.bases[&Group::ThirdDeck];

        assert!(!second.contains_key("bathroom_3"));
        assert_eq!(second["bathroom_2"], global["bathroom_2"] + global["bathroom_3"]);
        assert!(!third.contains_key("bathroom_2"));
        assert_eq!(third["bathroom_3"], global["bathroom_2"] + global["bathroom_3"]);

        let rotation = &contract.bases[&Group::Rotation];
        assert_eq!(rotation.keys().count(), 2);
        assert_eq!(contract.rotation.len(), 2);
    }

    #[test]
    fn unknown_group_tag_is_rejected() {
        let text = format!("{HOUSE}\n[groups.attic]\ntransfer = {{}}\n");
        let config = SemesterConfig::from_toml(&text).unwrap();
        assert!(matches!(
            config.derive_contract(&roster(20)),
            Err(RotaError::Config(ConfigError::UnknownGroup(tag))) if tag == "attic"
        ));
    }

    #[test]
    fn transfer_to_unknown_cleanup_is_rejected() {
        let mut config = SemesterConfig::from_toml(HOUSE).unwrap();
        config
            .groups
            .get_mut("second_deck")
            .unwrap()
            .transfer
            .insert("bathroom_3".into(), "bathroom_9".into());
        assert!(matches!(
            config.derive_contract(&roster(20)),
            Err(RotaError::Config(ConfigError::UnknownCleanup { .. }))
        ));
    }
}
