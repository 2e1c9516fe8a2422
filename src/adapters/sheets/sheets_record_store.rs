use std::sync::Arc;

use error_stack::{report, ResultExt};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::domain::apartment::{record_codec, record_row::RecordRow};
use crate::domain::sheets::{
    a1_notation::{A1Notation, ToA1Notation},
    cell_range::CellRange,
    row::Row,
};
use crate::ports::record_store::{position_of, RecordStore, RecordStoreError, StoreHandle};

use super::worksheet_backend::WorksheetBackend;

/// Keeps the record table in one worksheet: a header row followed by one row per record.
///
/// Reads never create or modify the worksheet. It is created, or its header widened, only
/// from `ensure_store` and `append_row`.
pub struct SheetsRecordStore {
    backend: Arc<dyn WorksheetBackend>,
    worksheet_title: String,
    owner_email: Option<String>,
    handle: RwLock<Option<StoreHandle>>,
}

impl std::fmt::Debug for SheetsRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SheetsRecordStore {{ worksheet_title: {:?} }}",
            self.worksheet_title
        )
    }
}

impl SheetsRecordStore {
    pub fn new(
        backend: Arc<dyn WorksheetBackend>,
        worksheet_title: impl Into<String>,
        owner_email: Option<String>,
    ) -> Self {
        Self {
            backend,
            worksheet_title: worksheet_title.into(),
            owner_email,
            handle: RwLock::new(None),
        }
    }

    fn header_range(&self, width: usize) -> A1Notation {
        CellRange::row_span(Row::from_index(0), width).to_a1_notation(Some(&self.worksheet_title))
    }

    fn data_row_range(&self, position: usize, width: usize) -> A1Notation {
        CellRange::row_span(Row::of_data_row(position), width)
            .to_a1_notation(Some(&self.worksheet_title))
    }

    fn whole_sheet(&self) -> A1Notation {
        A1Notation::whole_sheet(&self.worksheet_title)
    }

    async fn create_worksheet(&self) -> error_stack::Result<i32, RecordStoreError> {
        let sheet_id = self
            .backend
            .add_sheet(&self.worksheet_title)
            .await
            .change_context(RecordStoreError::BackendUnavailable)?;

        let header = record_codec::header();
        self.backend
            .write_row(&self.header_range(header.len()), &header)
            .await
            .change_context(RecordStoreError::BackendUnavailable)?;

        tracing::info!(
            worksheet = %self.worksheet_title,
            sheet_id,
            "Created record worksheet"
        );
        if let Some(owner_email) = &self.owner_email {
            // The Sheets API cannot grant access; sharing goes through Drive.
            tracing::info!(
                worksheet = %self.worksheet_title,
                %owner_email,
                "Share the new worksheet with its owner"
            );
        }

        Ok(sheet_id)
    }

    /// Rewrites the header when it predates columns the current schema writes.
    async fn upgrade_header(&self) -> error_stack::Result<(), RecordStoreError> {
        let header = record_codec::header();
        let existing = self
            .backend
            .read_range(&self.header_range(header.len()))
            .await
            .change_context(RecordStoreError::BackendUnavailable)?;

        let existing_width = existing.first().map(RecordRow::len).unwrap_or_default();
        if existing_width >= header.len() {
            return Ok(());
        }

        tracing::info!(
            worksheet = %self.worksheet_title,
            from = existing_width,
            to = header.len(),
            "Upgrading record header"
        );
        self.backend
            .write_row(&self.header_range(header.len()), &header)
            .await
            .change_context(RecordStoreError::BackendUnavailable)
    }

    /// Id of the worksheet if it already exists. Never creates it.
    async fn existing_sheet(&self) -> error_stack::Result<Option<i32>, RecordStoreError> {
        if let Some(handle) = self.handle.read().await.as_ref() {
            return Ok(Some(handle.sheet_id));
        }

        self.backend
            .find_sheet(&self.worksheet_title)
            .await
            .change_context(RecordStoreError::BackendUnavailable)
    }

    async fn require_sheet(&self) -> error_stack::Result<i32, RecordStoreError> {
        self.existing_sheet()
            .await?
            .ok_or_else(|| report!(RecordStoreError::NotFound))
            .attach_printable_lazy(|| format!("No worksheet titled '{}'", self.worksheet_title))
    }

    async fn read_data_rows(&self) -> error_stack::Result<Vec<RecordRow>, RecordStoreError> {
        let mut rows = self
            .backend
            .read_range(&self.whole_sheet())
            .await
            .change_context(RecordStoreError::BackendUnavailable)?;

        if !rows.is_empty() {
            rows.remove(0);
        }
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl RecordStore for SheetsRecordStore {
    #[instrument(skip(self), fields(worksheet = %self.worksheet_title))]
    async fn ensure_store(&self) -> error_stack::Result<StoreHandle, RecordStoreError> {
        {
            // -- MUTEX READ --
            let guard = self.handle.read().await;
            if let Some(handle) = guard.as_ref() {
                return Ok(handle.clone());
            }
        }

        // -- MUTEX WRITE --
        let mut guard = self.handle.write().await;
        if let Some(handle) = guard.as_ref() {
            return Ok(handle.clone());
        }

        let existing = self
            .backend
            .find_sheet(&self.worksheet_title)
            .await
            .change_context(RecordStoreError::BackendUnavailable)?;

        let sheet_id = match existing {
            Some(sheet_id) => {
                self.upgrade_header().await?;
                sheet_id
            }
            None => self.create_worksheet().await?,
        };

        let handle = StoreHandle {
            sheet_id,
            title: self.worksheet_title.clone(),
        };
        *guard = Some(handle.clone());
        Ok(handle)
    }

    #[instrument(skip(self))]
    async fn list_rows(&self) -> error_stack::Result<Vec<RecordRow>, RecordStoreError> {
        if self.existing_sheet().await?.is_none() {
            return Ok(Vec::new());
        }
        self.read_data_rows().await
    }

    #[instrument(skip(self, row))]
    async fn append_row(&self, row: RecordRow) -> error_stack::Result<(), RecordStoreError> {
        self.ensure_store().await?;
        self.backend
            .append_row(&self.whole_sheet(), &row)
            .await
            .change_context(RecordStoreError::BackendUnavailable)
    }

    #[instrument(skip(self, row))]
    async fn update_row(
        &self,
        name: &str,
        row: RecordRow,
    ) -> error_stack::Result<(), RecordStoreError> {
        self.require_sheet().await?;
        let rows = self.read_data_rows().await?;
        let position = position_of(&rows, name)
            .ok_or_else(|| report!(RecordStoreError::NotFound))
            .attach_printable_lazy(|| format!("No row named '{}'", name))?;

        // Blank out cells a wider stale row would otherwise keep.
        let width = row.len().max(rows[position].len());
        let mut cells = row.into_cells();
        cells.resize(width, String::new());

        self.backend
            .write_row(
                &self.data_row_range(position, width),
                &RecordRow::new(cells),
            )
            .await
            .change_context(RecordStoreError::BackendUnavailable)
    }

    #[instrument(skip(self))]
    async fn delete_row(&self, name: &str) -> error_stack::Result<(), RecordStoreError> {
        let sheet_id = self.require_sheet().await?;
        let rows = self.read_data_rows().await?;
        let position = position_of(&rows, name)
            .ok_or_else(|| report!(RecordStoreError::NotFound))
            .attach_printable_lazy(|| format!("No row named '{}'", name))?;

        self.backend
            .delete_row(sheet_id, Row::of_data_row(position))
            .await
            .change_context(RecordStoreError::BackendUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::adapters::sheets::spreadsheet_manager::SpreadsheetManagerError;

    const TITLE: &str = "Records";
    const SHEET_ID: i32 = 7;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        FindSheet,
        AddSheet,
        ReadRange(String),
        WriteRow(String, RecordRow),
        AppendRow(RecordRow),
        DeleteRow(i32, Row),
    }

    /// Worksheet held in memory. Row 0 is the header. Every call is recorded.
    #[derive(Default)]
    struct RecordingBackend {
        sheet_id: Mutex<Option<i32>>,
        rows: Mutex<Vec<RecordRow>>,
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingBackend {
        fn with_sheet(rows: Vec<RecordRow>) -> Self {
            Self {
                sheet_id: Mutex::new(Some(SHEET_ID)),
                rows: Mutex::new(rows),
                calls: Mutex::default(),
            }
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
            self.calls().iter().filter(|call| matches(call)).count()
        }

        fn writes(&self) -> usize {
            self.count(|call| matches!(call, Call::WriteRow(..) | Call::AppendRow(_)))
        }
    }

    type BackendResult<T> = error_stack::Result<T, SpreadsheetManagerError>;

    #[async_trait::async_trait]
    impl WorksheetBackend for RecordingBackend {
        async fn find_sheet(&self, _title: &str) -> BackendResult<Option<i32>> {
            self.record(Call::FindSheet);
            Ok(*self.sheet_id.lock().unwrap())
        }

        async fn add_sheet(&self, _title: &str) -> BackendResult<i32> {
            self.record(Call::AddSheet);
            *self.sheet_id.lock().unwrap() = Some(SHEET_ID);
            Ok(SHEET_ID)
        }

        async fn read_range(&self, range: &A1Notation) -> BackendResult<Vec<RecordRow>> {
            self.record(Call::ReadRange(range.to_string()));
            let rows = self.rows.lock().unwrap();
            if range.as_ref().contains('!') {
                // Only header ranges are read with explicit bounds.
                return Ok(rows.iter().take(1).cloned().collect());
            }
            Ok(rows.clone())
        }

        async fn write_row(&self, range: &A1Notation, row: &RecordRow) -> BackendResult<()> {
            self.record(Call::WriteRow(range.to_string(), row.clone()));
            if range.as_ref().contains("!A1:") {
                let mut rows = self.rows.lock().unwrap();
                match rows.first_mut() {
                    Some(header) => *header = row.clone(),
                    None => rows.push(row.clone()),
                }
            }
            Ok(())
        }

        async fn append_row(&self, _range: &A1Notation, row: &RecordRow) -> BackendResult<()> {
            self.record(Call::AppendRow(row.clone()));
            self.rows.lock().unwrap().push(row.clone());
            Ok(())
        }

        async fn delete_row(&self, sheet_id: i32, row: Row) -> BackendResult<()> {
            self.record(Call::DeleteRow(sheet_id, row));
            Ok(())
        }
    }

    fn row(cells: &[&str]) -> RecordRow {
        RecordRow::new(cells.iter().map(|cell| cell.to_string()).collect())
    }

    fn store(backend: &Arc<RecordingBackend>) -> SheetsRecordStore {
        SheetsRecordStore::new(backend.clone(), TITLE, None)
    }

    fn full_header_range() -> String {
        CellRange::row_span(Row::from_index(0), record_codec::header().len())
            .to_a1_notation(Some(TITLE))
            .to_string()
    }

    #[tokio::test]
    async fn test_ensure_store_twice_creates_the_sheet_once() {
        let backend = Arc::new(RecordingBackend::default());
        let store = store(&backend);

        let first = store.ensure_store().await.unwrap();
        let second = store.ensure_store().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.sheet_id, SHEET_ID);
        assert_eq!(backend.count(|call| *call == Call::AddSheet), 1);
        assert_eq!(backend.count(|call| *call == Call::FindSheet), 1);
        assert_eq!(
            backend.calls().last(),
            Some(&Call::WriteRow(full_header_range(), record_codec::header()))
        );
    }

    #[tokio::test]
    async fn test_list_on_missing_sheet_is_empty_and_writes_nothing() {
        let backend = Arc::new(RecordingBackend::default());
        let store = store(&backend);

        assert!(store.list_rows().await.unwrap().is_empty());
        assert!(store.list_rows().await.unwrap().is_empty());

        assert_eq!(backend.count(|call| *call == Call::AddSheet), 0);
        assert_eq!(backend.writes(), 0);
        assert_eq!(backend.calls(), vec![Call::FindSheet, Call::FindSheet]);
    }

    #[tokio::test]
    async fn test_list_skips_the_header_and_writes_nothing() {
        let backend = Arc::new(RecordingBackend::with_sheet(vec![
            row(&["name", "saved_at"]),
            row(&["A"]),
            row(&["B"]),
        ]));

        let rows = store(&backend).list_rows().await.unwrap();

        assert_eq!(rows, vec![row(&["A"]), row(&["B"])]);
        assert_eq!(backend.writes(), 0);
    }

    #[tokio::test]
    async fn test_short_header_is_widened() {
        let mut short = record_codec::header().into_cells();
        short.truncate(10);
        let backend = Arc::new(RecordingBackend::with_sheet(vec![RecordRow::new(short)]));

        store(&backend).ensure_store().await.unwrap();

        assert_eq!(backend.count(|call| *call == Call::AddSheet), 0);
        assert_eq!(
            backend.calls().last(),
            Some(&Call::WriteRow(full_header_range(), record_codec::header()))
        );
    }

    #[tokio::test]
    async fn test_current_header_is_left_alone() {
        let backend = Arc::new(RecordingBackend::with_sheet(vec![record_codec::header()]));

        store(&backend).ensure_store().await.unwrap();

        assert_eq!(backend.writes(), 0);
    }

    #[tokio::test]
    async fn test_append_creates_the_sheet_first() {
        let backend = Arc::new(RecordingBackend::default());

        store(&backend).append_row(row(&["A", "1"])).await.unwrap();

        let calls = backend.calls();
        let added = calls.iter().position(|call| *call == Call::AddSheet).unwrap();
        let appended = calls
            .iter()
            .position(|call| *call == Call::AppendRow(row(&["A", "1"])))
            .unwrap();
        assert!(added < appended);
    }

    #[tokio::test]
    async fn test_delete_of_third_data_row_targets_sheet_row_three() {
        let backend = Arc::new(RecordingBackend::with_sheet(vec![
            record_codec::header(),
            row(&["A"]),
            row(&["B"]),
            row(&["C"]),
            row(&["C"]),
        ]));

        store(&backend).delete_row("C").await.unwrap();

        assert_eq!(
            backend.calls().last(),
            Some(&Call::DeleteRow(SHEET_ID, Row::from_index(3)))
        );
    }

    #[tokio::test]
    async fn test_update_pads_out_stale_cells() {
        let backend = Arc::new(RecordingBackend::with_sheet(vec![
            record_codec::header(),
            row(&["A", "old", "x", "y"]),
            row(&["B"]),
        ]));

        store(&backend)
            .update_row("A", row(&["A", "new"]))
            .await
            .unwrap();

        assert_eq!(
            backend.calls().last(),
            Some(&Call::WriteRow(
                format!("'{}'!A2:D2", TITLE),
                row(&["A", "new", "", ""])
            ))
        );
    }

    #[tokio::test]
    async fn test_mutating_a_missing_sheet_is_not_found() {
        let backend = Arc::new(RecordingBackend::default());
        let store = store(&backend);

        let report = store.delete_row("A").await.unwrap_err();
        assert_eq!(*report.current_context(), RecordStoreError::NotFound);

        let report = store.update_row("A", row(&["A"])).await.unwrap_err();
        assert_eq!(*report.current_context(), RecordStoreError::NotFound);

        assert_eq!(backend.count(|call| *call == Call::AddSheet), 0);
    }
}
