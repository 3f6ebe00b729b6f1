//! FileCheckpointStore - `checkpoint.json` に保存する store
//!
//! # 学習ポイント
//! - fs2 の advisory lock（`checkpoint.json.lock`）でプロセス間の single writer
//! - 一時ファイル + rename による原子的な置き換え
//! - Async から blocking IO を呼ぶときは spawn_blocking

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::domain::{Checkpoint, StoreError};
use crate::ports::{CheckpointLease, CheckpointStore};

use super::fsio;

pub const CHECKPOINT_FILE: &str = "checkpoint.json";

#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/checkpoint.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CHECKPOINT_FILE))
    }
}

/// Missing file means nothing has been scheduled yet.
fn read_checkpoint(path: &Path) -> Result<Checkpoint, StoreError> {
    let Some(text) = fsio::read_optional(path)? else {
        return Ok(Checkpoint::empty());
    };
    serde_json::from_str(&text).map_err(|source| StoreError::Decode {
        path: path.display().to_string(),
        source,
    })
}

#[async_trait::async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn acquire(&self) -> Result<Box<dyn CheckpointLease>, StoreError> {
        let path = self.path.clone();
        let (lock, checkpoint) = tokio::task::spawn_blocking(move || {
            let lock = fsio::try_lock(&path)?;
            let checkpoint = read_checkpoint(&path)?;
            Ok::<_, StoreError>((lock, checkpoint))
        })
        .await
        .map_err(fsio::join_error)??;

        tracing::debug!(path = %self.path.display(), week = checkpoint.current_week(), "checkpoint lease acquired");
        Ok(Box::new(FileLease {
            path: self.path.clone(),
            lock,
            checkpoint,
        }))
    }

    async fn snapshot(&self) -> Result<Checkpoint, StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_checkpoint(&path))
            .await
            .map_err(fsio::join_error)?
    }
}

struct FileLease {
    path: PathBuf,
    /// Held for the lifetime of the lease; closing it releases the lock.
    lock: File,
    checkpoint: Checkpoint,
}

#[async_trait::async_trait]
impl CheckpointLease for FileLease {
    fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    async fn commit(self: Box<Self>, next: Checkpoint) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&next).map_err(StoreError::Encode)?;
        let FileLease { path, lock, .. } = *self;
        tokio::task::spawn_blocking(move || {
            let written = fsio::write_atomic(&path, &text);
            drop(lock);
            written
        })
        .await
        .map_err(fsio::join_error)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{WeekAssignment, WeekDelta};

    fn commit_week(checkpoint: &Checkpoint, person: &str, cleanup: &str) -> Checkpoint {
        let assignment: WeekAssignment = [(person.into(), cleanup.into())].into_iter().collect();
        checkpoint
            .apply(&WeekDelta {
                week: checkpoint.next_week(),
                assignment,
                cursor_advance: 1,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::in_dir(dir.path());
        assert_eq!(store.snapshot().await.unwrap(), Checkpoint::empty());
    }

    #[tokio::test]
    async fn committed_state_survives_a_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::in_dir(dir.path());
        let lease = store.acquire().await.unwrap();
        let next = commit_week(lease.checkpoint(), "alice", "kitchen");
        lease.commit(next.clone()).await.unwrap();

        let reopened = FileCheckpointStore::in_dir(dir.path());
        let lease = reopened.acquire().await.unwrap();
        assert_eq!(lease.checkpoint(), &next);
    }

    #[tokio::test]
    async fn lease_excludes_other_writers_until_released() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::in_dir(dir.path());
        let other = FileCheckpointStore::in_dir(dir.path());

        let lease = store.acquire().await.unwrap();
        assert!(matches!(other.acquire().await, Err(StoreError::Locked(_))));
        drop(lease);

        let lease = other.acquire().await.unwrap();
        lease.commit(Checkpoint::empty()).await.unwrap();
        assert!(store.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn abandoned_lease_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::in_dir(dir.path());
        let lease = store.acquire().await.unwrap();
        let week_one = commit_week(lease.checkpoint(), "alice", "kitchen");
        lease.commit(week_one.clone()).await.unwrap();

        let lease = store.acquire().await.unwrap();
        let _unused = commit_week(lease.checkpoint(), "alice", "stairs");
        drop(lease);

        assert_eq!(store.snapshot().await.unwrap(), week_one);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CHECKPOINT_FILE), "{ not json").unwrap();
        let store = FileCheckpointStore::in_dir(dir.path());
        assert!(matches!(
            store.snapshot().await,
            Err(StoreError::Decode { .. })
        ));
    }
}
