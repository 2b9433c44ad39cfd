use super::SpreadsheetSource;
use crate::error::Result;
use crate::types::Tab;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// In-memory workbook for development/testing. Tabs can be swapped while
/// the service runs, which mirrors someone editing the live spreadsheet.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    tabs: Arc<Mutex<Vec<Tab>>>,
}

impl InMemorySource {
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self {
            tabs: Arc::new(Mutex::new(tabs)),
        }
    }

    pub fn replace(&self, tabs: Vec<Tab>) {
        let mut guard = self.tabs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = tabs;
    }
}

#[async_trait]
impl SpreadsheetSource for InMemorySource {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn list_tabs(&self) -> Result<Vec<Tab>> {
        let tabs = self.tabs.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone();
        debug!("Serving {} in-memory tabs", tabs.len());
        Ok(tabs)
    }
}
