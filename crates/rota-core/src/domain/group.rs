//! Eligibility groups and the policy each one carries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of eligibility groups.
///
/// Legacy roster files encoded these as integers (`1` out-of-house, `2` second
/// deck, `3` third deck); `FromStr` still accepts those codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    OutOfHouse,
    SecondDeck,
    ThirdDeck,
    Rotation,
}

/// How weekly cleanups are chosen for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentMode {
    /// Deficit-driven against a per-cleanup base quota.
    Quota,
    /// Round-robin over an allowed list, no per-person counters.
    Rotation,
}

/// Which side of the population-balance rule a group is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residency {
    Internal,
    External,
}

/// Policy object attached to each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPolicy {
    pub mode: AssignmentMode,
    pub residency: Residency,
}

impl Group {
    pub const ALL: [Group; 4] = [
        Group::OutOfHouse,
        Group::SecondDeck,
        Group::ThirdDeck,
        Group::Rotation,
    ];

    pub fn policy(self) -> GroupPolicy {
        match self {
            Group::OutOfHouse => GroupPolicy {
                mode: AssignmentMode::Quota,
                residency: Residency::External,
            },
            Group::SecondDeck | Group::ThirdDeck => GroupPolicy {
                mode: AssignmentMode::Quota,
                residency: Residency::Internal,
            },
            Group::Rotation => GroupPolicy {
                mode: AssignmentMode::Rotation,
                residency: Residency::Internal,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Group::OutOfHouse => "out_of_house",
            Group::SecondDeck => "second_deck",
            Group::ThirdDeck => "third_deck",
            Group::Rotation => "rotation",
        }
    }

    pub fn is_external(self) -> bool {
        self.policy().residency == Residency::External
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a tag matches no group; the caller attaches the person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGroupTag(pub String);

impl FromStr for Group {
    type Err = UnknownGroupTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        match tag {
            "out_of_house" | "1" => Ok(Group::OutOfHouse),
            "second_deck" | "2" => Ok(Group::SecondDeck),
            "third_deck" | "3" => Ok(Group::ThirdDeck),
            "rotation" => Ok(Group::Rotation),
            _ => Err(UnknownGroupTag(tag.to_string())),
        }
    }
}
