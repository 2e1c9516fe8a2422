use error_stack::{report, ResultExt};
use tokio::sync::RwLock;

use crate::domain::apartment::record_row::RecordRow;
use crate::ports::record_store::{position_of, RecordStore, RecordStoreError, StoreHandle};

const IN_MEMORY_TITLE: &str = "in-memory";

/// Process-local record table. Backs `--in-memory` runs and the application tests.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    // `None` until the table is created.
    rows: RwLock<Option<Vec<RecordRow>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose table already holds `rows`, in order, below the header.
    pub fn with_rows(rows: Vec<RecordRow>) -> Self {
        Self {
            rows: RwLock::new(Some(rows)),
        }
    }

    fn handle() -> StoreHandle {
        StoreHandle {
            sheet_id: 0,
            title: IN_MEMORY_TITLE.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn ensure_store(&self) -> error_stack::Result<StoreHandle, RecordStoreError> {
        let mut rows = self.rows.write().await;
        rows.get_or_insert_with(Vec::new);
        Ok(Self::handle())
    }

    async fn list_rows(&self) -> error_stack::Result<Vec<RecordRow>, RecordStoreError> {
        let rows = self.rows.read().await;
        Ok(rows.clone().unwrap_or_default())
    }

    async fn append_row(&self, row: RecordRow) -> error_stack::Result<(), RecordStoreError> {
        let mut rows = self.rows.write().await;
        rows.get_or_insert_with(Vec::new).push(row);
        Ok(())
    }

    async fn update_row(
        &self,
        name: &str,
        row: RecordRow,
    ) -> error_stack::Result<(), RecordStoreError> {
        let mut guard = self.rows.write().await;
        let rows = guard.get_or_insert_with(Vec::new);
        let position = position_of(rows, name)
            .ok_or_else(|| report!(RecordStoreError::NotFound))
            .attach_printable_lazy(|| format!("No row named '{}'", name))?;

        rows[position] = row;
        Ok(())
    }

    async fn delete_row(&self, name: &str) -> error_stack::Result<(), RecordStoreError> {
        let mut guard = self.rows.write().await;
        let rows = guard.get_or_insert_with(Vec::new);
        let position = position_of(rows, name)
            .ok_or_else(|| report!(RecordStoreError::NotFound))
            .attach_printable_lazy(|| format!("No row named '{}'", name))?;

        rows.remove(position);
        Ok(())
    }
}
