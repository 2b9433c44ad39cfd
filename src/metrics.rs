//! Prometheus metrics for lookups and spreadsheet fetches.
//!
//! The recorder is installed once per process; the handle renders the text
//! exposition served on `GET /metrics`. Recording before `init_metrics` is
//! a no-op, which keeps tests and one-shot CLI commands quiet.

use crate::types::PartFamily;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const SEARCHES_TOTAL: &str = "parts_xref_searches_total";
pub const FETCH_ERRORS_TOTAL: &str = "parts_xref_fetch_errors_total";
pub const TABS_SKIPPED_TOTAL: &str = "parts_xref_tabs_skipped_total";
pub const FETCH_DURATION_SECONDS: &str = "parts_xref_fetch_duration_seconds";
pub const FACTS_PER_REQUEST: &str = "parts_xref_facts_per_request";

/// Install the Prometheus recorder. Idempotent.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_ok() {
                info!("Prometheus recorder installed");
            }
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Current metrics in Prometheus text format, empty if not initialized.
pub fn render() -> String {
    HANDLE.get().map(|h| h.render()).unwrap_or_default()
}

/// How a search request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Exact,
    Prefix,
    NotFound,
    Rejected,
    Failed,
}

impl SearchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOutcome::Exact => "exact",
            SearchOutcome::Prefix => "prefix",
            SearchOutcome::NotFound => "not_found",
            SearchOutcome::Rejected => "rejected",
            SearchOutcome::Failed => "failed",
        }
    }
}

pub struct LookupMetrics;

impl LookupMetrics {
    pub fn record_search(family: PartFamily, outcome: SearchOutcome) {
        ::metrics::counter!(
            SEARCHES_TOTAL,
            "family" => family.as_str(),
            "outcome" => outcome.as_str()
        )
        .increment(1);
    }

    pub fn record_facts(family: PartFamily, facts: usize) {
        ::metrics::histogram!(FACTS_PER_REQUEST, "family" => family.as_str()).record(facts as f64);
    }

    pub fn record_fetch_error(source: &str) {
        ::metrics::counter!(FETCH_ERRORS_TOTAL, "source" => source.to_string()).increment(1);
    }

    pub fn record_tab_skipped(source: &str) {
        ::metrics::counter!(TABS_SKIPPED_TOTAL, "source" => source.to_string()).increment(1);
    }

    pub fn record_fetch_duration(source: &str, duration_secs: f64) {
        ::metrics::histogram!(FETCH_DURATION_SECONDS, "source" => source.to_string()).record(duration_secs);
    }
}
