//! CheckpointStore port - スケジューリング状態の永続化
//!
//! # 実装
//! - `InMemoryCheckpointStore`（テスト用）
//! - `FileCheckpointStore`（`checkpoint.json` + advisory lock）

use crate::domain::{Checkpoint, StoreError};

/// CheckpointStore は Checkpoint を丸ごと保存・読み出しする
///
/// # 設計原則
/// - 書き込みは `acquire` で得た lease 経由のみ（single writer）
/// - commit は全フィールドを一度に置き換える（部分更新しない）
/// - 保存されたことのない store は空の Checkpoint を返す
#[async_trait::async_trait]
pub trait CheckpointStore: Send + Sync {
    /// 書き込み権を取得する。他のライターが保持中なら `StoreError::Locked`。
    async fn acquire(&self) -> Result<Box<dyn CheckpointLease>, StoreError>;

    /// Lock を取らずに現在の状態を読む（表示・検証用）。
    async fn snapshot(&self) -> Result<Checkpoint, StoreError>;
}

/// 取得済みの書き込み権
///
/// commit せずに drop した場合は lock だけが解放され、状態は変わらない。
#[async_trait::async_trait]
pub trait CheckpointLease: Send {
    /// Lease 取得時点の状態
    fn checkpoint(&self) -> &Checkpoint;

    /// `next` で状態を置き換え、lock を解放する
    async fn commit(self: Box<Self>, next: Checkpoint) -> Result<(), StoreError>;
}
