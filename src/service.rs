//! Per-request lookup orchestration.
//!
//! Every call validates the query, fetches the whole workbook, classifies and
//! normalizes it, then searches. Nothing survives between calls.

use crate::classify::{classify_brake_pad_tab, classify_brake_pads, classify_wiper_tab, classify_wipers, ClassifyOptions};
use crate::config::Config;
use crate::constants::PREFIX_LEN;
use crate::error::{Result, XrefError};
use crate::metrics::{LookupMetrics, SearchOutcome};
use crate::normalize::{normalize, normalize_brake_pads, normalize_token, strip_leading_marker, AltSplitPolicy};
use crate::search::{search, search_brake_pads, search_by_prefix};
use crate::sheets::{GoogleSheetsClient, JsonFileSource, SpreadsheetSource};
use crate::types::{BrakePadGroup, Fact, PartFamily, SearchResponse, Tab, WiperGroup};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Row counts for one tab, as seen by both classifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabSummary {
    pub name: String,
    pub rows: usize,
    pub wiper_rows: usize,
    pub brake_pad_rows: usize,
}

pub struct LookupService {
    source: Arc<dyn SpreadsheetSource>,
    policy: AltSplitPolicy,
    options: ClassifyOptions,
}

impl LookupService {
    pub fn new(source: Arc<dyn SpreadsheetSource>, policy: AltSplitPolicy, options: ClassifyOptions) -> Self {
        Self { source, policy, options }
    }

    /// Build the service with the source the configuration points at: a
    /// local workbook file if one is set, Google Sheets otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source: Arc<dyn SpreadsheetSource> = match &config.sheets.data_file {
            Some(path) => {
                info!("Reading parts from workbook file {}", path.display());
                Arc::new(JsonFileSource::new(path.clone()))
            }
            None => Arc::new(GoogleSheetsClient::new(&config.sheets)?),
        };
        Ok(Self::new(source, config.lookup.split_policy, config.lookup.classify_options()))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    async fn fetch_tabs(&self) -> Result<Vec<Tab>> {
        self.source.list_tabs().await.map_err(|e| {
            error!(source = self.source.name(), error = %e, "Failed to fetch spreadsheet");
            LookupMetrics::record_fetch_error(self.source.name());
            match e {
                XrefError::Config(_) | XrefError::Fetch { .. } => e,
                other => XrefError::Fetch { message: other.to_string() },
            }
        })
    }

    /// Fetch and normalize the wiper facts.
    pub async fn wiper_facts(&self) -> Result<Vec<Fact>> {
        let tabs = self.fetch_tabs().await?;
        let rows = classify_wipers(&tabs, self.options);
        if rows.is_empty() {
            warn!("Spreadsheet holds no wiper rows");
            return Err(XrefError::NoData);
        }
        let facts = normalize(&rows, self.policy);
        LookupMetrics::record_facts(PartFamily::Wipers, facts.len());
        Ok(facts)
    }

    /// Fetch and normalize the brake-pad facts.
    pub async fn brake_pad_facts(&self) -> Result<Vec<Fact>> {
        let tabs = self.fetch_tabs().await?;
        let rows = classify_brake_pads(&tabs, self.options);
        if rows.is_empty() {
            warn!("Spreadsheet holds no brake-pad rows");
            return Err(XrefError::NoData);
        }
        let facts = normalize_brake_pads(&rows);
        LookupMetrics::record_facts(PartFamily::BrakePads, facts.len());
        Ok(facts)
    }

    /// Exact wiper lookup, falling back to a 3-character prefix search when
    /// nothing matches exactly.
    #[instrument(skip(self), fields(request_id = %Uuid::new_v4()))]
    pub async fn search(&self, query: &str) -> Result<SearchResponse<WiperGroup>> {
        let result = self.search_wipers(query).await;
        record(PartFamily::Wipers, &result);
        result.map(|(response, _)| response)
    }

    async fn search_wipers(&self, query: &str) -> Result<(SearchResponse<WiperGroup>, SearchOutcome)> {
        let shown = validated(query)?;
        let stripped = strip_leading_marker(shown);
        let facts = self.wiper_facts().await?;

        let exact = search(stripped, &facts);
        if !exact.is_empty() {
            info!("Found {} groups for {}", exact.len(), shown);
            return Ok((found(shown, exact), SearchOutcome::Exact));
        }

        if stripped.chars().count() >= PREFIX_LEN {
            let by_prefix = search_by_prefix(stripped, &facts);
            if !by_prefix.is_empty() {
                let prefix = prefix_of(stripped);
                info!("No exact match for {}, {} groups share prefix {}", shown, by_prefix.len(), prefix);
                let message = format!("No exact match for \"{shown}\"; showing parts starting with \"{prefix}\":");
                return Ok((SearchResponse { message, results: by_prefix }, SearchOutcome::Prefix));
            }
        }

        Ok((not_found(shown), SearchOutcome::NotFound))
    }

    /// Wiper lookup by the first three characters of the query only.
    #[instrument(skip(self), fields(request_id = %Uuid::new_v4()))]
    pub async fn search_prefix(&self, query: &str) -> Result<SearchResponse<WiperGroup>> {
        let result = self.search_wipers_by_prefix(query).await;
        record(PartFamily::Wipers, &result);
        result.map(|(response, _)| response)
    }

    async fn search_wipers_by_prefix(&self, query: &str) -> Result<(SearchResponse<WiperGroup>, SearchOutcome)> {
        let shown = validated(query)?;
        let stripped = strip_leading_marker(shown);
        if stripped.chars().count() < PREFIX_LEN {
            return Err(XrefError::PrefixTooShort { min: PREFIX_LEN });
        }

        let facts = self.wiper_facts().await?;
        let groups = search_by_prefix(stripped, &facts);
        if groups.is_empty() {
            return Ok((not_found(shown), SearchOutcome::NotFound));
        }
        let message = format!("Parts starting with \"{}\":", prefix_of(stripped));
        Ok((SearchResponse { message, results: groups }, SearchOutcome::Prefix))
    }

    /// Brake-pad lookup: case-insensitive exact match, one result per main part.
    #[instrument(skip(self), fields(request_id = %Uuid::new_v4()))]
    pub async fn search_brake_pads(&self, query: &str) -> Result<SearchResponse<BrakePadGroup>> {
        let result = self.search_brake_pad_groups(query).await;
        record(PartFamily::BrakePads, &result);
        result.map(|(response, _)| response)
    }

    async fn search_brake_pad_groups(&self, query: &str) -> Result<(SearchResponse<BrakePadGroup>, SearchOutcome)> {
        let shown = validated(query)?;
        let facts = self.brake_pad_facts().await?;
        let results = search_brake_pads(shown, &facts);
        if results.is_empty() {
            return Ok((not_found(shown), SearchOutcome::NotFound));
        }
        info!("Found {} brake-pad entries for {}", results.len(), shown);
        Ok((found(shown, results), SearchOutcome::Exact))
    }

    /// Per-tab row counts for both part families.
    #[instrument(skip(self))]
    pub async fn inspect(&self) -> Result<Vec<TabSummary>> {
        let tabs = self.fetch_tabs().await?;
        Ok(tabs
            .iter()
            .map(|tab| TabSummary {
                name: tab.name.clone(),
                rows: tab.rows.len(),
                wiper_rows: classify_wiper_tab(tab, self.options).len(),
                brake_pad_rows: classify_brake_pad_tab(tab, self.options).len(),
            })
            .collect())
    }
}

fn validated(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(XrefError::EmptyQuery);
    }
    Ok(trimmed)
}

fn prefix_of(query: &str) -> String {
    normalize_token(query).chars().take(PREFIX_LEN).collect()
}

fn found<G>(shown: &str, results: Vec<G>) -> SearchResponse<G> {
    SearchResponse {
        message: format!("Found analogs for part number \"{shown}\":"),
        results,
    }
}

fn not_found<G>(shown: &str) -> SearchResponse<G> {
    SearchResponse {
        message: format!("Part number \"{shown}\" not found in database"),
        results: Vec::new(),
    }
}

fn record<T>(family: PartFamily, result: &Result<(T, SearchOutcome)>) {
    let outcome = match result {
        Ok((_, outcome)) => *outcome,
        Err(e) if e.is_client_error() => SearchOutcome::Rejected,
        Err(_) => SearchOutcome::Failed,
    };
    LookupMetrics::record_search(family, outcome);
}
