//! Small helpers shared across service modules.

use chrono::NaiveDate;
use dpm_backend::Row;
use serde_json::Value;

/// Converts a `json!({...})` literal into a row map.
pub(crate) fn json_object(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

/// Formats a date the way the hosted schema stores it.
pub(crate) fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
