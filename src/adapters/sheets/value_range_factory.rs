use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::domain::apartment::record_row::RecordRow;

pub trait ValueRangeFactory {
    fn from_row(row: &RecordRow) -> Self;
}

fn wrap_value(value: &str) -> Value {
    Value::String(value.to_owned())
}

impl ValueRangeFactory for ValueRange {
    fn from_row(row: &RecordRow) -> Self {
        ValueRange {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(vec![row.cells().iter().map(|cell| wrap_value(cell)).collect()]),
        }
    }
}
