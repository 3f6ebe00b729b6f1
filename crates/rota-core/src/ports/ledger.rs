//! AssignmentLedger port - 割り当て表（正本）
//!
//! 週ごとの行を追記していく表です。Checkpoint が壊れても、
//! ここから `AssignmentTable::rebuild` で状態を作り直せます。

use crate::domain::{AssignmentTable, RotaError, TableRow};

/// AssignmentLedger は確定済みの週の記録
///
/// # 設計原則
/// - 同じ内容の週を再度 append しても何も起きない（再実行に安全）
/// - 内容の異なる週の append は `StateError::LedgerConflict`
/// - rollback に合わせて `truncate_to` で末尾を削る
#[async_trait::async_trait]
pub trait AssignmentLedger: Send + Sync {
    async fn load(&self) -> Result<AssignmentTable, RotaError>;

    async fn append(&self, row: TableRow) -> Result<(), RotaError>;

    /// `week` より後の行をすべて削除する
    async fn truncate_to(&self, week: u32) -> Result<(), RotaError>;
}
