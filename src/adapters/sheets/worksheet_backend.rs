use crate::domain::apartment::record_row::RecordRow;
use crate::domain::sheets::{a1_notation::A1Notation, row::Row};

use super::{
    spreadsheet_manager::{SpreadsheetManager, SpreadsheetManagerError},
    spreadsheet_read::SpreadsheetRead,
    spreadsheet_write::SpreadsheetWrite,
};

type Result<T> = error_stack::Result<T, SpreadsheetManagerError>;

/// The spreadsheet calls the record store is built on.
#[async_trait::async_trait]
pub trait WorksheetBackend: Send + Sync {
    async fn find_sheet(&self, title: &str) -> Result<Option<i32>>;

    async fn add_sheet(&self, title: &str) -> Result<i32>;

    async fn read_range(&self, range: &A1Notation) -> Result<Vec<RecordRow>>;

    async fn write_row(&self, range: &A1Notation, row: &RecordRow) -> Result<()>;

    async fn append_row(&self, range: &A1Notation, row: &RecordRow) -> Result<()>;

    async fn delete_row(&self, sheet_id: i32, row: Row) -> Result<()>;
}

#[async_trait::async_trait]
impl WorksheetBackend for SpreadsheetManager {
    async fn find_sheet(&self, title: &str) -> Result<Option<i32>> {
        SpreadsheetManager::find_sheet(self, title).await
    }

    async fn add_sheet(&self, title: &str) -> Result<i32> {
        SpreadsheetManager::add_sheet(self, title).await
    }

    async fn read_range(&self, range: &A1Notation) -> Result<Vec<RecordRow>> {
        SpreadsheetRead::read_range(self, range).await
    }

    async fn write_row(&self, range: &A1Notation, row: &RecordRow) -> Result<()> {
        SpreadsheetWrite::write_row(self, range, row).await
    }

    async fn append_row(&self, range: &A1Notation, row: &RecordRow) -> Result<()> {
        SpreadsheetWrite::append_row(self, range, row).await
    }

    async fn delete_row(&self, sheet_id: i32, row: Row) -> Result<()> {
        SpreadsheetManager::delete_row(self, sheet_id, row).await
    }
}
