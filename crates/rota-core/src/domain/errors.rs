//! Errors - エラー型と分類
//!
//! すべてのエラーは現在の操作に対して致命的で、Checkpoint を部分的に
//! 変更することなく中断します。強制割り当て（fallback）はエラーではなく
//! `PlacementKind::Forced` として記録されます。

use thiserror::Error;

use super::names::{CleanupName, PersonName};

/// ErrorKind は運用上の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// quota contract / semester config の欠落・不正
    Config,
    /// Checkpoint や台帳の状態が操作と矛盾している
    StateInconsistency,
    /// roster の入力エラー
    Validation,
    /// 永続化層の障害（IO, lock, serde）
    Storage,
}

/// Quota contract or semester configuration is missing or malformed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[error("no cleanup types configured")]
    NoCleanups,

    #[error("cleanup name must not be blank")]
    BlankCleanup,

    #[error("cleanup `{0}` is configured more than once")]
    DuplicateCleanup(CleanupName),

    #[error("{context} references unknown cleanup `{cleanup}`")]
    UnknownCleanup {
        context: String,
        cleanup: CleanupName,
    },

    #[error("unknown eligibility group `{0}`")]
    UnknownGroup(String),

    #[error("no base quota for eligibility group `{0}`")]
    MissingGroup(String),

    #[error("eligibility group `{0}` has no eligible cleanups")]
    EmptyEligibility(String),

    #[error("semester end {end} is before start {start}")]
    InvertedSemester { start: String, end: String },

    #[error("invalid date `{value}`: {message}")]
    InvalidDate { value: String, message: String },
}

/// The requested operation contradicts the recorded scheduling state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("no committed week to roll back")]
    NothingToRollback,

    #[error("week {got} is out of sequence (expected week {expected})")]
    OutOfSequence { expected: u32, got: u32 },

    #[error("all {num_weeks} weeks have already been scheduled")]
    SemesterComplete { num_weeks: u32 },

    #[error("assignment table row {row} has no usable `week` column")]
    MissingWeekColumn { row: usize },

    #[error("assignment table lists week {0} more than once")]
    DuplicateWeek(u32),

    #[error("history is not contiguous: expected week {expected}, found week {found}")]
    HistoryGap { expected: u32, found: u32 },

    #[error("assignment table cell for `{person}` in week {week} is not a cleanup name")]
    MalformedCell { week: u32, person: PersonName },

    #[error("ledger already holds a different assignment for week {0}")]
    LedgerConflict(u32),

    #[error("checkpoint diverges from {source_name}: {detail}")]
    Diverged {
        source_name: &'static str,
        detail: String,
    },
}

/// Roster input that cannot be accepted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("roster is empty")]
    EmptyRoster,

    #[error("roster entry {index} has a blank name")]
    BlankName { index: usize },

    #[error("person `{0}` appears more than once in the roster")]
    DuplicatePerson(PersonName),

    #[error("`{0}` is reserved for the assignment table's week column")]
    ReservedName(PersonName),

    #[error("person `{person}` has unrecognized group tag `{tag}`")]
    UnknownGroup { person: PersonName, tag: String },
}

/// Persistence failures surfaced by the store and ledger adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("another writer holds the lock on {0}")]
    Locked(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode state: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("blocking task failed: {0}")]
    Join(String),
}

/// RotaError はクレート全体のエラー
#[derive(Debug, Error)]
pub enum RotaError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("state inconsistency: {0}")]
    State(#[from] StateError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl RotaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RotaError::Config(_) => ErrorKind::Config,
            RotaError::State(_) => ErrorKind::StateInconsistency,
            RotaError::Validation(_) => ErrorKind::Validation,
            RotaError::Store(_) => ErrorKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        let err: RotaError = StateError::NothingToRollback.into();
        assert_eq!(err.kind(), ErrorKind::StateInconsistency);

        let err: RotaError = ValidationError::EmptyRoster.into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: RotaError = ConfigError::NoCleanups.into();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn messages_name_the_offending_input() {
        let err = ValidationError::UnknownGroup {
            person: "alice".into(),
            tag: "7".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "person `alice` has unrecognized group tag `7`"
        );

        let err = StateError::OutOfSequence {
            expected: 3,
            got: 5,
        };
        assert_eq!(
            err.to_string(),
            "week 5 is out of sequence (expected week 3)"
        );
    }
}
