//! FileLedger - `assignments.json` に保存する割り当て表
//!
//! 読み書きのたびに `assignments.json.lock` を取り、
//! read-modify-write 全体を他プロセスから守ります。

use std::path::{Path, PathBuf};

use crate::domain::{AssignmentTable, RotaError, StoreError, TableRow};
use crate::ports::AssignmentLedger;

use super::fsio;

pub const LEDGER_FILE: &str = "assignments.json";

#[derive(Debug, Clone)]
pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/assignments.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(LEDGER_FILE))
    }

    /// Run `edit` on the table under the file lock and write it back if it
    /// reports a change.
    async fn modify<F>(&self, edit: F) -> Result<(), RotaError>
    where
        F: FnOnce(&mut AssignmentTable) -> Result<bool, RotaError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let _lock = fsio::try_lock(&path)?;
            let mut table = read_table(&path)?;
            if edit(&mut table)? {
                let text = table.to_json().map_err(StoreError::Encode)?;
                fsio::write_atomic(&path, &text)?;
            }
            Ok::<(), RotaError>(())
        })
        .await
        .map_err(fsio::join_error)?
    }
}

fn read_table(path: &Path) -> Result<AssignmentTable, RotaError> {
    match fsio::read_optional(path)? {
        Some(text) => AssignmentTable::from_json(&text),
        None => Ok(AssignmentTable::default()),
    }
}

#[async_trait::async_trait]
impl AssignmentLedger for FileLedger {
    async fn load(&self) -> Result<AssignmentTable, RotaError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_table(&path))
            .await
            .map_err(fsio::join_error)?
    }

    async fn append(&self, row: TableRow) -> Result<(), RotaError> {
        self.modify(move |table| Ok(table.append(row)?)).await
    }

    async fn truncate_to(&self, week: u32) -> Result<(), RotaError> {
        self.modify(move |table| {
            let before = table.rows().len();
            table.truncate_to(week);
            Ok(table.rows().len() != before)
        })
        .await
    }
}
