use std::{fmt::Debug, time::Duration};

use error_stack::{report, ResultExt};
use google_sheets4::{
    api::{
        AddSheetRequest, BatchUpdateSpreadsheetRequest, DeleteDimensionRequest, DimensionRange,
        Request, SheetProperties,
    },
    Sheets,
};
use thiserror::Error;
use tracing::instrument;

use crate::adapters::config::sheets_config::SpreadsheetConfig;
use crate::domain::sheets::row::Row;

use super::{
    auth::{self},
    http_client::{self, HttpsConnector},
    retry::{is_transient, with_single_retry},
};

pub struct SpreadsheetManager {
    pub config: SpreadsheetConfig,
    pub(super) hub: Sheets<HttpsConnector>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager {{ config: {:?} }}", self.config)
    }
}

#[derive(Error, Debug)]
pub enum SpreadsheetManagerError {
    #[error("Failed to authenticate against the spreadsheet backend")]
    Authentication,
    #[error("Failed to fetch spreadsheet")]
    FailedToFetchSpreadsheet,
    #[error("Failed to add sheet")]
    FailedToAddSheet,
    #[error("Failed to fetch range")]
    FailedToFetchRange,
    #[error("Failed to write range")]
    FailedToWriteRange,
    #[error("Failed to append to range")]
    FailedToAppendRange,
    #[error("Failed to delete row")]
    FailedToDeleteRow,
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new")]
    pub async fn new(
        config: SpreadsheetConfig,
    ) -> error_stack::Result<Self, SpreadsheetManagerError> {
        let client = http_client::http_client();
        let auth = auth::auth(&config, client.clone())
            .await
            .change_context(SpreadsheetManagerError::Authentication)?;
        let hub = Sheets::new(client, auth);

        Ok(SpreadsheetManager { config, hub })
    }

    pub(super) fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    /// Id of the worksheet titled `title`, if the spreadsheet has one.
    #[instrument]
    pub async fn find_sheet(
        &self,
        title: &str,
    ) -> error_stack::Result<Option<i32>, SpreadsheetManagerError> {
        let (_, spreadsheet) =
            with_single_retry("spreadsheets.get", self.timeout(), is_transient, || {
                self.hub
                    .spreadsheets()
                    .get(&self.config.spreadsheet_id)
                    .doit()
            })
            .await
            .map_err(|failure| {
                report!(SpreadsheetManagerError::FailedToFetchSpreadsheet)
                    .attach_printable(failure.to_string())
            })?;

        let sheet_id = spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sheet| sheet.properties)
            .find(|properties| properties.title.as_deref() == Some(title))
            .and_then(|properties| properties.sheet_id);

        Ok(sheet_id)
    }

    #[instrument]
    pub async fn add_sheet(&self, title: &str) -> error_stack::Result<i32, SpreadsheetManagerError> {
        let request = BatchUpdateSpreadsheetRequest {
            requests: Some(vec![Request {
                add_sheet: Some(AddSheetRequest {
                    properties: Some(SheetProperties {
                        title: Some(title.to_string()),
                        ..Default::default()
                    }),
                }),
                ..Default::default()
            }]),
            ..Default::default()
        };

        let (_, response) =
            with_single_retry("spreadsheets.batchUpdate", self.timeout(), is_transient, || {
                self.hub
                    .spreadsheets()
                    .batch_update(request.clone(), &self.config.spreadsheet_id)
                    .doit()
            })
            .await
            .map_err(|failure| {
                report!(SpreadsheetManagerError::FailedToAddSheet)
                    .attach_printable(failure.to_string())
            })?;

        response
            .replies
            .unwrap_or_default()
            .into_iter()
            .find_map(|reply| reply.add_sheet?.properties?.sheet_id)
            .ok_or_else(|| report!(SpreadsheetManagerError::FailedToAddSheet))
            .attach_printable_lazy(|| format!("No sheet id returned for new sheet '{}'", title))
    }

    #[instrument]
    pub async fn delete_row(
        &self,
        sheet_id: i32,
        row: Row,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let start_index = i32::try_from(row.index())
            .change_context(SpreadsheetManagerError::FailedToDeleteRow)?;

        let request = BatchUpdateSpreadsheetRequest {
            requests: Some(vec![Request {
                delete_dimension: Some(DeleteDimensionRequest {
                    range: Some(DimensionRange {
                        sheet_id: Some(sheet_id),
                        dimension: Some("ROWS".to_string()),
                        start_index: Some(start_index),
                        end_index: Some(start_index + 1),
                    }),
                }),
                ..Default::default()
            }]),
            ..Default::default()
        };

        with_single_retry("spreadsheets.batchUpdate", self.timeout(), is_transient, || {
            self.hub
                .spreadsheets()
                .batch_update(request.clone(), &self.config.spreadsheet_id)
                .doit()
        })
        .await
        .map(|_| ())
        .map_err(|failure| {
            report!(SpreadsheetManagerError::FailedToDeleteRow)
                .attach_printable(failure.to_string())
                .attach_printable(format!("Row {} of sheet {}", row, sheet_id))
        })
    }
}
