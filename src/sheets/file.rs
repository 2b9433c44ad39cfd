use super::{decode_rows, SpreadsheetSource};
use crate::error::{Result, XrefError};
use crate::metrics::LookupMetrics;
use crate::types::Tab;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
struct Workbook {
    #[serde(default)]
    tabs: Vec<Value>,
}

/// Workbook exported to a local JSON file:
///
/// ```json
/// { "tabs": [ { "name": "Sheet1", "rows": [["Front Wipers"], ["6R1998002", "1S1, 5E1"]] } ] }
/// ```
///
/// The file is re-read on every call, like the remote spreadsheet.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn decode_tab(index: usize, value: &Value) -> Result<Tab> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| XrefError::Fetch {
            message: format!("tab #{index} has no name"),
        })?;
    let rows = decode_rows(value.get("rows"))?;
    Ok(Tab::new(name, rows))
}

#[async_trait]
impl SpreadsheetSource for JsonFileSource {
    fn name(&self) -> &str {
        "json_file"
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn list_tabs(&self) -> Result<Vec<Tab>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let workbook: Workbook = serde_json::from_str(&content)?;

        let mut tabs = Vec::with_capacity(workbook.tabs.len());
        for (index, raw) in workbook.tabs.iter().enumerate() {
            match decode_tab(index, raw) {
                Ok(tab) => tabs.push(tab),
                Err(e) => {
                    warn!(tab = index, error = %e, "Skipping malformed tab");
                    LookupMetrics::record_tab_skipped(self.name());
                }
            }
        }

        info!("Loaded {} tabs from workbook file", tabs.len());
        Ok(tabs)
    }
}
