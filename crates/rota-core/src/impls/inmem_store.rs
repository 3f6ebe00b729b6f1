//! InMemoryCheckpointStore - テスト用の Checkpoint 保存先
//!
//! # 学習ポイント
//! - `tokio::sync::Mutex::try_lock_owned` による fail-fast な single writer
//! - OwnedMutexGuard を lease に持たせ、drop で自動解放

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::{Checkpoint, StoreError};
use crate::ports::{CheckpointLease, CheckpointStore};

/// InMemoryCheckpointStore はプロセス内だけで生きる store
///
/// # 実装詳細
/// - `writer`: 書き込み権（lease が guard を保持）
/// - `state`: 最後に commit された Checkpoint
#[derive(Clone, Default)]
pub struct InMemoryCheckpointStore {
    writer: Arc<Mutex<()>>,
    state: Arc<RwLock<Checkpoint>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の状態から始める
    pub fn with_checkpoint(checkpoint: Checkpoint) -> Self {
        Self {
            writer: Arc::default(),
            state: Arc::new(RwLock::new(checkpoint)),
        }
    }
}

#[async_trait::async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn acquire(&self) -> Result<Box<dyn CheckpointLease>, StoreError> {
        let guard = self
            .writer
            .clone()
            .try_lock_owned()
            .map_err(|_| StoreError::Locked("in-memory checkpoint".to_string()))?;
        let checkpoint = self.state.read().await.clone();
        Ok(Box::new(InMemoryLease {
            _guard: guard,
            state: self.state.clone(),
            checkpoint,
        }))
    }

    async fn snapshot(&self) -> Result<Checkpoint, StoreError> {
        Ok(self.state.read().await.clone())
    }
}

struct InMemoryLease {
    _guard: OwnedMutexGuard<()>,
    state: Arc<RwLock<Checkpoint>>,
    checkpoint: Checkpoint,
}

#[async_trait::async_trait]
impl CheckpointLease for InMemoryLease {
    fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    async fn commit(self: Box<Self>, next: Checkpoint) -> Result<(), StoreError> {
        *self.state.write().await = next;
        Ok(())
    }
}
