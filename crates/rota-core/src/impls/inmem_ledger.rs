//! InMemoryLedger - テスト用の割り当て表

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{AssignmentTable, RotaError, TableRow};
use crate::ports::AssignmentLedger;

#[derive(Clone, Default)]
pub struct InMemoryLedger {
    table: Arc<Mutex<AssignmentTable>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: AssignmentTable) -> Self {
        Self {
            table: Arc::new(Mutex::new(table)),
        }
    }
}

#[async_trait::async_trait]
impl AssignmentLedger for InMemoryLedger {
    async fn load(&self) -> Result<AssignmentTable, RotaError> {
        Ok(self.table.lock().await.clone())
    }

    async fn append(&self, row: TableRow) -> Result<(), RotaError> {
        self.table.lock().await.append(row)?;
        Ok(())
    }

    async fn truncate_to(&self, week: u32) -> Result<(), RotaError> {
        self.table.lock().await.truncate_to(week);
        Ok(())
    }
}
