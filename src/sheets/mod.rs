//! Spreadsheet sources: where raw tabs come from.

pub mod file;
pub mod google;
pub mod memory;

pub use file::JsonFileSource;
pub use google::{GoogleSheetsClient, SheetsAuth};
pub use memory::InMemorySource;

use crate::error::{Result, XrefError};
use crate::types::Tab;
use async_trait::async_trait;
use serde_json::Value;

/// Port for the external spreadsheet. Every call returns the complete
/// workbook or an error; there is no caching behind it.
#[async_trait]
pub trait SpreadsheetSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch every tab with all its rows.
    async fn list_tabs(&self) -> Result<Vec<Tab>>;
}

/// Render one JSON cell as text. Strings pass through, numbers keep their
/// printed form, anything else is treated as an empty cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Decode a `[[cell, ...], ...]` payload. A missing or null payload is an
/// empty tab; any other shape is an error for that tab alone.
pub fn decode_rows(value: Option<&Value>) -> Result<Vec<Vec<String>>> {
    let rows = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(rows)) => rows,
        Some(other) => {
            return Err(XrefError::Fetch {
                message: format!("expected an array of rows, got {}", kind(other)),
            })
        }
    };

    rows.iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Array(cells) => Ok(cells.iter().map(cell_text).collect()),
            other => Err(XrefError::Fetch {
                message: format!("row {i} is {} instead of an array", kind(other)),
            }),
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_text_renders_numbers_and_drops_other_values() {
        assert_eq!(cell_text(&json!("5E1")), "5E1");
        assert_eq!(cell_text(&json!(1998002)), "1998002");
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!(true)), "");
        assert_eq!(cell_text(&json!({"v": 1})), "");
    }

    #[test]
    fn test_decode_rows_accepts_ragged_rows() {
        let rows = decode_rows(Some(&json!([["Front Wipers"], ["6R1998002", "1S1, 5E1"]]))).unwrap();
        assert_eq!(rows, vec![vec!["Front Wipers".to_string()], vec!["6R1998002".into(), "1S1, 5E1".into()]]);
    }

    #[test]
    fn test_decode_rows_missing_payload_is_empty_tab() {
        assert!(decode_rows(None).unwrap().is_empty());
        assert!(decode_rows(Some(&Value::Null)).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rows_rejects_unexpected_shapes() {
        assert!(decode_rows(Some(&json!({"rows": []}))).is_err());
        assert!(decode_rows(Some(&json!([["ok"], "broken"]))).is_err());
    }
}
