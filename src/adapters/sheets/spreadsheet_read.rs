use error_stack::report;
use tracing::instrument;

use crate::domain::apartment::record_row::RecordRow;
use crate::domain::sheets::a1_notation::A1Notation;

use super::{
    retry::{is_transient, with_single_retry},
    spreadsheet_manager::{SpreadsheetManager, SpreadsheetManagerError},
    value_rows::IntoRecordRows,
};

pub trait SpreadsheetRead {
    /// Rows of `range` as cell text. An empty range yields no rows.
    async fn read_range(
        &self,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<RecordRow>, SpreadsheetManagerError>;
}

impl SpreadsheetRead for SpreadsheetManager {
    #[instrument]
    async fn read_range(
        &self,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<RecordRow>, SpreadsheetManagerError> {
        let (_, value_range) =
            with_single_retry("spreadsheets.values.get", self.timeout(), is_transient, || {
                self.hub
                    .spreadsheets()
                    .values_get(&self.config.spreadsheet_id, range.as_ref())
                    .doit()
            })
            .await
            .map_err(|failure| {
                report!(SpreadsheetManagerError::FailedToFetchRange)
                    .attach_printable(failure.to_string())
                    .attach_printable(format!("Range {}", range))
            })?;

        Ok(value_range.values.unwrap_or_default().into_record_rows())
    }
}
