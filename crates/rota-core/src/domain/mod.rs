//! Domain model (names, roster, quota contract, checkpoint, assignment table).
//!
//! モジュール構成:
//! - 入力: names, group, roster, contract, semester
//! - 状態: plan, checkpoint, table
//! - エラー: errors

pub mod checkpoint;
pub mod contract;
pub mod errors;
pub mod group;
pub mod names;
pub mod plan;
pub mod roster;
pub mod semester;
pub mod table;

pub use checkpoint::{Checkpoint, Counts};
pub use contract::{AssignerPolicy, BaseQuota, CleanupSpec, QuotaContract};
pub use errors::{ConfigError, ErrorKind, RotaError, StateError, StoreError, ValidationError};
pub use group::{AssignmentMode, Group, GroupPolicy, Residency, UnknownGroupTag};
pub use names::{CleanupName, Name, NameMarker, PersonName};
pub use plan::{Placement, PlacementKind, WeekAssignment, WeekDelta, WeekPlan};
pub use roster::{Member, Roster};
pub use semester::SemesterConfig;
pub use table::{AssignmentTable, TableRow};
