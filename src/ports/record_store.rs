use thiserror::Error;

use crate::domain::apartment::record_row::RecordRow;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStoreError {
    #[error("Record store backend is unavailable")]
    BackendUnavailable,
    #[error("No record with the requested name")]
    NotFound,
}

/// Where the record table lives inside the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHandle {
    pub sheet_id: i32,
    pub title: String,
}

/// Tabular storage for saved records, one row per record keyed by its first cell.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates the record table (with its header row) when absent. Safe to call repeatedly.
    async fn ensure_store(&self) -> error_stack::Result<StoreHandle, RecordStoreError>;

    /// Every data row, header excluded, in the order the backend keeps them.
    async fn list_rows(&self) -> error_stack::Result<Vec<RecordRow>, RecordStoreError>;

    async fn append_row(&self, row: RecordRow) -> error_stack::Result<(), RecordStoreError>;

    /// Overwrites the first row whose name equals `name`.
    async fn update_row(
        &self,
        name: &str,
        row: RecordRow,
    ) -> error_stack::Result<(), RecordStoreError>;

    /// Removes the first row whose name equals `name`, and only that row.
    async fn delete_row(&self, name: &str) -> error_stack::Result<(), RecordStoreError>;
}

/// Position of the first data row named `name`.
pub fn position_of(rows: &[RecordRow], name: &str) -> Option<usize> {
    rows.iter().position(|row| row.name() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> RecordRow {
        RecordRow::new(vec![name.to_string()])
    }

    #[test]
    fn test_position_of_first_match() {
        let rows = vec![row("A"), row("B"), row("B")];
        assert_eq!(position_of(&rows, "B"), Some(1));
        assert_eq!(position_of(&rows, "C"), None);
    }

    #[test]
    fn test_position_of_is_case_sensitive() {
        let rows = vec![row("Unit A")];
        assert_eq!(position_of(&rows, "unit a"), None);
    }
}
