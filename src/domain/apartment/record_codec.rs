use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use super::{
    apartment_name::ApartmentName,
    configuration::{Configuration, FIELDS},
    record_row::RecordRow,
};

pub const NAME_COLUMN: &str = "name";
pub const SAVED_AT_COLUMN: &str = "saved_at";

/// Columns before the first configuration field.
const LEADING_COLUMNS: usize = 2;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("Record row has no name")]
    MalformedRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedRecord {
    pub name: String,
    /// `None` when the timestamp cell is missing or unreadable.
    pub saved_at: Option<DateTime<Utc>>,
    pub configuration: Configuration,
}

/// Width of a row written with the current schema.
pub fn row_width() -> usize {
    LEADING_COLUMNS + FIELDS.len()
}

pub fn header() -> RecordRow {
    let mut cells = Vec::with_capacity(row_width());
    cells.push(NAME_COLUMN.to_string());
    cells.push(SAVED_AT_COLUMN.to_string());
    cells.extend(FIELDS.iter().map(|spec| spec.key.to_string()));
    RecordRow::new(cells)
}

pub fn encode(config: &Configuration, name: &ApartmentName, now: DateTime<Utc>) -> RecordRow {
    let mut cells = Vec::with_capacity(row_width());
    cells.push(name.to_string());
    cells.push(now.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    cells.extend(config.iter().map(|(_, value)| value.to_cell()));
    RecordRow::new(cells)
}

/// Reads every known field from its column, falling back to the field default when the cell is
/// absent (older, shorter rows) or unreadable.
pub fn decode_record(row: &RecordRow) -> Result<SavedRecord, CodecError> {
    let name = row.name().ok_or(CodecError::MalformedRecord)?.to_owned();

    let saved_at = row
        .cell(1)
        .and_then(|cell| DateTime::parse_from_rfc3339(cell.trim()).ok())
        .map(|timestamp| timestamp.with_timezone(&Utc));

    let mut configuration = Configuration::default();
    for (offset, spec) in FIELDS.iter().enumerate() {
        let parsed = row
            .cell(LEADING_COLUMNS + offset)
            .and_then(|cell| spec.kind().parse_cell(cell));

        if let Some(value) = parsed {
            if configuration.set(spec.key, value).is_err() {
                tracing::debug!(field = spec.key, "Ignoring unusable cell, keeping default");
            }
        }
    }

    Ok(SavedRecord {
        name,
        saved_at,
        configuration,
    })
}

pub fn decode(row: &RecordRow) -> Result<Configuration, CodecError> {
    decode_record(row).map(|record| record.configuration)
}
