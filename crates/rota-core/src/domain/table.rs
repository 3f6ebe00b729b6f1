//! Authoritative assignment table (one row per week, one column per person).
//!
//! This is the system of record used by rebuild. On disk it is a JSON array:
//! `[{"week": 1, "alice": "kitchen", "bob": null}, ...]`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::checkpoint::Checkpoint;
use super::errors::{ConfigError, RotaError, StateError};
use super::names::{CleanupName, PersonName};
use super::plan::WeekAssignment;
use super::roster::WEEK_COLUMN;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub week: u32,
    #[serde(flatten)]
    pub cells: BTreeMap<PersonName, Option<CleanupName>>,
}

impl TableRow {
    pub fn from_assignment(week: u32, assignment: &WeekAssignment) -> Self {
        Self {
            week,
            cells: assignment
                .iter()
                .map(|(p, c)| (p.clone(), Some(c.clone())))
                .collect(),
        }
    }

    /// Non-empty cells only.
    pub fn assignment(&self) -> WeekAssignment {
        self.cells
            .iter()
            .filter_map(|(p, c)| c.as_ref().map(|c| (p.clone(), c.clone())))
            .collect()
    }

    /// Rows are the same week's assignment if their filled cells agree.
    pub fn same_assignment(&self, other: &TableRow) -> bool {
        self.week == other.week && self.assignment() == other.assignment()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AssignmentTable {
    rows: Vec<TableRow>,
}

impl AssignmentTable {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, week: u32) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.week == week)
    }

    /// Add a week row. Re-appending an identical row is a no-op and returns
    /// `false`; a different row for an existing week is a conflict.
    pub fn append(&mut self, row: TableRow) -> Result<bool, StateError> {
        match self.row(row.week) {
            Some(existing) if existing.same_assignment(&row) => Ok(false),
            Some(_) => Err(StateError::LedgerConflict(row.week)),
            None => {
                self.rows.push(row);
                Ok(true)
            }
        }
    }

    /// Drop every row after `week`.
    pub fn truncate_to(&mut self, week: u32) {
        self.rows.retain(|r| r.week <= week);
    }

    /// Table view of a checkpoint's history.
    pub fn from_checkpoint(checkpoint: &Checkpoint) -> Self {
        Self::new(
            checkpoint
                .weekly_history()
                .iter()
                .map(|(week, assignment)| TableRow::from_assignment(*week, assignment))
                .collect(),
        )
    }

    /// Parse the on-disk JSON form, tolerating empty cells (`null` or `""`).
    pub fn from_json(text: &str) -> Result<Self, RotaError> {
        let value: Value = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            what: "assignment table",
            message: e.to_string(),
        })?;
        let Value::Array(items) = value else {
            return Err(ConfigError::Parse {
                what: "assignment table",
                message: "expected a JSON array of week rows".to_string(),
            }
            .into());
        };

        let mut rows = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let Value::Object(mut fields) = item else {
                return Err(StateError::MissingWeekColumn { row: index }.into());
            };
            let week = fields
                .remove(WEEK_COLUMN)
                .and_then(|w| week_number(&w))
                .ok_or(StateError::MissingWeekColumn { row: index })?;

            let mut cells = BTreeMap::new();
            for (person, cell) in fields {
                let person = PersonName::new(person);
                let cleanup = match cell {
                    Value::Null => None,
                    Value::String(s) if s.trim().is_empty() => None,
                    Value::String(s) => Some(CleanupName::new(s.trim())),
                    _ => return Err(StateError::MalformedCell { week, person }.into()),
                };
                cells.insert(person, cleanup);
            }
            rows.push(TableRow { week, cells });
        }
        Ok(Self { rows })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Week-ordered history. Weeks must be unique; contiguity is checked by
    /// `Checkpoint::from_history`.
    pub fn history(&self) -> Result<BTreeMap<u32, WeekAssignment>, StateError> {
        let mut history = BTreeMap::new();
        for row in &self.rows {
            if history.insert(row.week, row.assignment()).is_some() {
                return Err(StateError::DuplicateWeek(row.week));
            }
        }
        Ok(history)
    }

    /// Rebuild operator: derive a fresh checkpoint from this table alone.
    pub fn rebuild(&self) -> Result<Checkpoint, StateError> {
        Checkpoint::from_history(self.history()?)
    }
}

/// Accepts `3`, `3.0` and `"3"`; spreadsheet exports produce all three.
fn week_number(value: &Value) -> Option<u32> {
    let week = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    week.filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR_WEEKS: &str = r#"[
        {"week": 2, "alice": "stairs", "bob": "kitchen", "carol": null},
        {"week": 1, "alice": "kitchen", "bob": "stairs", "carol": "deck_0"},
        {"week": 4, "alice": "deck_0", "bob": "", "carol": "kitchen"},
        {"week": 3.0, "alice": "kitchen", "bob": "deck_0", "carol": "stairs"}
    ]"#;

    #[test]
    fn rebuild_tolerates_sparse_cells_and_row_order() {
        let table = AssignmentTable::from_json(FOUR_WEEKS).unwrap();
        let cp = table.rebuild().unwrap();

        assert_eq!(cp.current_week(), 4);
        assert_eq!(cp.round_robin_index(), 4);
        assert_eq!(cp.count("alice", "kitchen"), 2);
        // bob is empty in week 4, so week 3 wins
        assert_eq!(cp.last_cleanup("bob").map(|c| c.as_str()), Some("deck_0"));
        assert_eq!(cp.week(2).unwrap().len(), 2);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let table = AssignmentTable::from_json(FOUR_WEEKS).unwrap();
        let first = table.rebuild().unwrap();
        let again = AssignmentTable::from_checkpoint(&first).rebuild().unwrap();
        assert_eq!(first, again);
        assert_eq!(table.rebuild().unwrap(), first);
    }

    #[test]
    fn row_without_week_is_rejected() {
        let err = AssignmentTable::from_json(r#"[{"week": 1, "a": "x"}, {"a": "y"}]"#).unwrap_err();
        assert!(matches!(
            err,
            RotaError::State(StateError::MissingWeekColumn { row: 1 })
        ));
    }

    #[test]
    fn duplicate_and_missing_weeks_are_rejected() {
        let dup = AssignmentTable::from_json(r#"[{"week": 1}, {"week": "1"}]"#).unwrap();
        assert_eq!(dup.rebuild(), Err(StateError::DuplicateWeek(1)));

        let gap = AssignmentTable::from_json(r#"[{"week": 1}, {"week": 3}]"#).unwrap();
        assert_eq!(
            gap.rebuild(),
            Err(StateError::HistoryGap {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn non_string_cell_is_rejected() {
        let err = AssignmentTable::from_json(r#"[{"week": 1, "alice": 4}]"#).unwrap_err();
        assert!(matches!(
            err,
            RotaError::State(StateError::MalformedCell { week: 1, .. })
        ));
    }

    #[test]
    fn append_is_idempotent_but_rejects_conflicts() {
        let mut table = AssignmentTable::from_json(FOUR_WEEKS).unwrap();
        let week_two = table.row(2).unwrap().clone();
        assert_eq!(table.append(week_two.clone()), Ok(false));

        let mut changed = week_two;
        changed.cells.insert("carol".into(), Some("kitchen".into()));
        assert_eq!(table.append(changed), Err(StateError::LedgerConflict(2)));

        let week_five = TableRow::from_assignment(5, &table.row(1).unwrap().assignment());
        assert_eq!(table.append(week_five), Ok(true));
        table.truncate_to(3);
        assert_eq!(table.rows().len(), 3);
        assert!(table.row(4).is_none());
    }

    #[test]
    fn written_form_reads_back() {
        let table = AssignmentTable::from_json(FOUR_WEEKS).unwrap();
        let text = table.to_json().unwrap();
        assert_eq!(AssignmentTable::from_json(&text).unwrap(), table);
    }
}
