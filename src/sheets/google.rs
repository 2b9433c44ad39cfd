use super::{decode_rows, SpreadsheetSource};
use crate::config::SheetsConfig;
use crate::constants::SHEETS_SCOPE;
use crate::error::{Result, XrefError};
use crate::metrics::LookupMetrics;
use crate::types::Tab;
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{RequestBuilder, Url};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Credentials for the Sheets API.
#[derive(Clone, PartialEq, Eq)]
pub enum SheetsAuth {
    /// API key, enough for link-shared spreadsheets.
    ApiKey(String),
    /// OAuth2 access token obtained out of band.
    BearerToken(String),
    /// Service-account key file, exchanged for short-lived access tokens.
    ServiceAccount(PathBuf),
}

impl SheetsAuth {
    /// Explicit access token first, then a service-account key file, then
    /// an API key. Blank values count as unset.
    pub fn from_config(config: &SheetsConfig) -> Option<Self> {
        let set = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        if let Some(token) = set(&config.access_token) {
            return Some(SheetsAuth::BearerToken(token));
        }
        if let Some(path) = &config.service_account_file {
            return Some(SheetsAuth::ServiceAccount(path.clone()));
        }
        set(&config.api_key).map(SheetsAuth::ApiKey)
    }
}

impl std::fmt::Debug for SheetsAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetsAuth::ApiKey(_) => f.write_str("ApiKey(..)"),
            SheetsAuth::BearerToken(_) => f.write_str("BearerToken(..)"),
            SheetsAuth::ServiceAccount(path) => write!(f, "ServiceAccount({})", path.display()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    values: Option<Value>,
}

/// Google Sheets API v4 client reading every tab of one spreadsheet.
///
/// A missing spreadsheet id or missing credentials do not stop the client
/// from being built; every fetch reports them as a configuration error.
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    base_url: Url,
    spreadsheet_id: Option<String>,
    auth: Option<SheetsAuth>,
    service_account: OnceCell<CustomServiceAccount>,
}

impl std::fmt::Debug for GoogleSheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsClient")
            .field("base_url", &self.base_url.as_str())
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("auth", &self.auth)
            .finish()
    }
}

impl GoogleSheetsClient {
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        let spreadsheet_id = config.spreadsheet_id.clone().filter(|id| !id.trim().is_empty());
        if spreadsheet_id.is_none() {
            warn!("GOOGLE_SHEETS_ID is not set; lookups will fail until it is");
        }

        let auth = SheetsAuth::from_config(config);
        if auth.is_none() {
            warn!("No Google credentials configured; lookups will fail until they are");
        }

        let base_url = Url::parse(&config.api_base)
            .map_err(|e| XrefError::Config(format!("invalid Sheets API base '{}': {e}", config.api_base)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url,
            spreadsheet_id,
            auth,
            service_account: OnceCell::new(),
        })
    }

    pub fn auth(&self) -> Option<&SheetsAuth> {
        self.auth.as_ref()
    }

    fn spreadsheet_id(&self) -> Result<&str> {
        self.spreadsheet_id
            .as_deref()
            .ok_or_else(|| XrefError::Config("GOOGLE_SHEETS_ID is not set".into()))
    }

    fn credentials(&self) -> Result<&SheetsAuth> {
        self.auth.as_ref().ok_or_else(|| {
            XrefError::Config(
                "set GOOGLE_SERVICE_ACCOUNT_FILE, GOOGLE_ACCESS_TOKEN or GOOGLE_API_KEY to read the spreadsheet"
                    .into(),
            )
        })
    }

    fn url(&self, extra: &[&str]) -> Result<Url> {
        let spreadsheet_id = self.spreadsheet_id()?;
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| XrefError::Config(format!("Sheets API base '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id])
            .extend(extra);
        Ok(url)
    }

    /// `{base}/v4/spreadsheets/{id}`
    pub fn spreadsheet_url(&self) -> Result<Url> {
        self.url(&[])
    }

    /// `{base}/v4/spreadsheets/{id}/values/{'title'}` with the A1 range
    /// quoted so titles with spaces or quotes address the whole tab.
    pub fn values_url(&self, title: &str) -> Result<Url> {
        let range = format!("'{}'", title.replace('\'', "''"));
        self.url(&["values", range.as_str()])
    }

    /// The key file is read once; `gcp_auth` caches and refreshes tokens.
    async fn service_account_token(&self, path: &Path) -> Result<String> {
        let account = self
            .service_account
            .get_or_try_init(|| async { CustomServiceAccount::from_file(path) })
            .await?;
        let token = account.token(&[SHEETS_SCOPE]).await?;
        Ok(token.as_str().to_string())
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.credentials()? {
            SheetsAuth::ApiKey(key) => request.query(&[("key", key.as_str())]),
            SheetsAuth::BearerToken(token) => request.bearer_auth(token),
            SheetsAuth::ServiceAccount(path) => request.bearer_auth(self.service_account_token(path).await?),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> Result<T> {
        let shown = url.to_string();
        let request = self.authorize(self.client.get(url).query(query)).await?;
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(XrefError::Fetch {
                message: format!("{shown} returned {status}: {}", body.chars().take(200).collect::<String>()),
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn tab_titles(&self) -> Result<Vec<String>> {
        let meta: SpreadsheetMeta = self
            .get_json(self.spreadsheet_url()?, &[("fields", "sheets.properties.title")])
            .await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }
}

#[async_trait]
impl SpreadsheetSource for GoogleSheetsClient {
    fn name(&self) -> &str {
        "google_sheets"
    }

    /// A failed request fails the whole fetch. Only a tab whose payload has
    /// the wrong shape is skipped.
    #[instrument(skip(self), fields(spreadsheet = ?self.spreadsheet_id))]
    async fn list_tabs(&self) -> Result<Vec<Tab>> {
        self.spreadsheet_id()?;
        self.credentials()?;

        let started = Instant::now();
        let titles = self.tab_titles().await?;
        debug!("Spreadsheet has {} tabs", titles.len());

        let mut tabs = Vec::with_capacity(titles.len());
        for title in titles {
            let range: ValueRange = self.get_json(self.values_url(&title)?, &[]).await?;
            match decode_rows(range.values.as_ref()) {
                Ok(rows) => tabs.push(Tab { name: title, rows }),
                Err(e) => {
                    warn!(tab = %title, error = %e, "Skipping malformed tab");
                    LookupMetrics::record_tab_skipped(self.name());
                }
            }
        }

        info!("Fetched {} tabs from Google Sheets", tabs.len());
        LookupMetrics::record_fetch_duration(self.name(), started.elapsed().as_secs_f64());
        Ok(tabs)
    }
}
