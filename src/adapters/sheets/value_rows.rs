use serde_json::Value;

use crate::domain::apartment::record_row::RecordRow;

pub trait IntoRecordRows {
    fn into_record_rows(self) -> Vec<RecordRow>;
}

impl IntoRecordRows for Vec<Vec<Value>> {
    fn into_record_rows(self) -> Vec<RecordRow> {
        self.into_iter()
            .map(|row| RecordRow::new(row.into_iter().map(cell_text).collect()))
            .collect()
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
