//! Roster: the ordered list of people being scheduled.

use std::collections::BTreeSet;

use serde::Deserialize;

use super::errors::{ConfigError, RotaError, ValidationError};
use super::group::Group;
use super::names::PersonName;

/// Column name the assignment table uses for the week number.
pub const WEEK_COLUMN: &str = "week";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: PersonName,
    pub group: Group,
}

/// Validated roster. Order is significant: it fixes each rotation-class
/// member's position in the round-robin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    members: Vec<Member>,
}

/// On-disk shape (`roster.toml`). Group tags stay strings here so an unknown
/// tag becomes a `ValidationError` naming the person rather than a serde error.
#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default, rename = "person")]
    people: Vec<RawMember>,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    name: String,
    group: toml::Value,
}

impl Roster {
    pub fn new(members: Vec<Member>) -> Result<Self, ValidationError> {
        if members.is_empty() {
            return Err(ValidationError::EmptyRoster);
        }
        let mut seen = BTreeSet::new();
        for (index, member) in members.iter().enumerate() {
            if member.name.is_blank() {
                return Err(ValidationError::BlankName { index });
            }
            if member.name.as_str() == WEEK_COLUMN {
                return Err(ValidationError::ReservedName(member.name.clone()));
            }
            if !seen.insert(member.name.clone()) {
                return Err(ValidationError::DuplicatePerson(member.name.clone()));
            }
        }
        Ok(Self { members })
    }

    /// Parse `roster.toml`.
    pub fn from_toml(text: &str) -> Result<Self, RotaError> {
        let file: RosterFile = toml::from_str(text).map_err(|e| ConfigError::Parse {
            what: "roster",
            message: e.to_string(),
        })?;

        let members = file
            .people
            .into_iter()
            .map(|raw| {
                let name = PersonName::new(raw.name.trim());
                // legacy files carry numeric codes (2 or 2.0)
                let tag = match &raw.group {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
                    other => other.to_string(),
                };
                let group = tag
                    .parse::<Group>()
                    .map_err(|e| ValidationError::UnknownGroup {
                        person: name.clone(),
                        tag: e.0,
                    })?;
                Ok(Member { name, group })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(Self::new(members)?)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name.as_str() == name)
    }

    /// Groups present in this roster, deduplicated.
    pub fn groups(&self) -> BTreeSet<Group> {
        self.members.iter().map(|m| m.group).collect()
    }

    /// Members of the rotation class in roster order.
    pub fn rotation_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.group == Group::Rotation)
    }
}
