use error_stack::report;
use google_sheets4::api::ValueRange;
use tracing::instrument;

use crate::domain::apartment::record_row::RecordRow;
use crate::domain::sheets::a1_notation::A1Notation;

use super::{
    retry::{is_transient, with_single_retry},
    spreadsheet_manager::{SpreadsheetManager, SpreadsheetManagerError},
    value_range_factory::ValueRangeFactory,
};

// Cells are stored exactly as given; USER_ENTERED would reformat numbers and dates.
const VALUE_INPUT_OPTION: &str = "RAW";

pub trait SpreadsheetWrite {
    async fn write_row(
        &self,
        range: &A1Notation,
        row: &RecordRow,
    ) -> error_stack::Result<(), SpreadsheetManagerError>;

    /// Appends `row` below the last populated row of the table found in `range`.
    async fn append_row(
        &self,
        range: &A1Notation,
        row: &RecordRow,
    ) -> error_stack::Result<(), SpreadsheetManagerError>;
}

impl SpreadsheetWrite for SpreadsheetManager {
    #[instrument(skip(row))]
    async fn write_row(
        &self,
        range: &A1Notation,
        row: &RecordRow,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let value_range = ValueRange::from_row(row);

        with_single_retry("spreadsheets.values.update", self.timeout(), is_transient, || {
            self.hub
                .spreadsheets()
                .values_update(
                    value_range.clone(),
                    &self.config.spreadsheet_id,
                    range.as_ref(),
                )
                .value_input_option(VALUE_INPUT_OPTION)
                .doit()
        })
        .await
        .map(|_| ())
        .map_err(|failure| {
            report!(SpreadsheetManagerError::FailedToWriteRange)
                .attach_printable(failure.to_string())
                .attach_printable(format!("Failed to write to range {}", range))
        })
    }

    #[instrument(skip(row))]
    async fn append_row(
        &self,
        range: &A1Notation,
        row: &RecordRow,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let value_range = ValueRange::from_row(row);

        with_single_retry("spreadsheets.values.append", self.timeout(), is_transient, || {
            self.hub
                .spreadsheets()
                .values_append(
                    value_range.clone(),
                    &self.config.spreadsheet_id,
                    range.as_ref(),
                )
                .value_input_option(VALUE_INPUT_OPTION)
                .insert_data_option("INSERT_ROWS")
                .doit()
        })
        .await
        .map(|_| ())
        .map_err(|failure| {
            report!(SpreadsheetManagerError::FailedToAppendRange)
                .attach_printable(failure.to_string())
                .attach_printable(format!("Failed to append to range {}", range))
        })
    }
}
