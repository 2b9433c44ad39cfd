use crate::classify::ClassifyOptions;
use crate::constants::{
    DEFAULT_CONFIG_PATH, DEFAULT_PORT, DEFAULT_SHEETS_API_BASE, DEFAULT_STATIC_DIR, DEFAULT_TIMEOUT_SECONDS,
};
use crate::error::{Result, XrefError};
use crate::normalize::AltSplitPolicy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sheets: SheetsConfig,
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub spreadsheet_id: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    /// Path to a service-account key file, exchanged for access tokens.
    pub service_account_file: Option<PathBuf>,
    pub api_base: String,
    pub timeout_seconds: u64,
    /// Read tabs from a local JSON workbook instead of Google Sheets.
    pub data_file: Option<PathBuf>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            api_key: None,
            access_token: None,
            service_account_file: None,
            api_base: DEFAULT_SHEETS_API_BASE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            data_file: None,
        }
    }
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("service_account_file", &self.service_account_file)
            .field("api_base", &self.api_base)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("data_file", &self.data_file)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub split_policy: AltSplitPolicy,
    pub cross_family_filter: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            split_policy: AltSplitPolicy::Strict,
            cross_family_filter: true,
        }
    }
}

impl LookupConfig {
    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            cross_family_filter: self.cross_family_filter,
        }
    }
}

impl Config {
    /// Load `.env`, then the TOML file (`XREF_CONFIG` or `parts_xref.toml`
    /// if present), then environment overrides.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let explicit = std::env::var("XREF_CONFIG").ok();
        let path = explicit.clone().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else if explicit.is_some() {
            return Err(XrefError::Config(format!("Config file '{}' does not exist", path)));
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            XrefError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment-style overrides. `lookup` returns the value of a
    /// variable if it is set.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GOOGLE_SHEETS_ID") {
            self.sheets.spreadsheet_id = Some(v);
        }
        if let Some(v) = lookup("GOOGLE_API_KEY") {
            self.sheets.api_key = Some(v);
        }
        if let Some(v) = lookup("GOOGLE_ACCESS_TOKEN") {
            self.sheets.access_token = Some(v);
        }
        if let Some(v) = lookup("GOOGLE_SERVICE_ACCOUNT_FILE") {
            self.sheets.service_account_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("SHEETS_API_BASE") {
            self.sheets.api_base = v;
        }
        if let Some(v) = lookup("XREF_DATA_FILE") {
            self.sheets.data_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("XREF_TIMEOUT_SECONDS") {
            self.sheets.timeout_seconds = parse_number("XREF_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = lookup("XREF_SPLIT_POLICY") {
            self.lookup.split_policy = v.parse()?;
        }
        if let Some(v) = lookup("XREF_CROSS_FILTER") {
            self.lookup.cross_family_filter = parse_flag("XREF_CROSS_FILTER", &v)?;
        }
        if let Some(v) = lookup("XREF_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_number("PORT", &v)?;
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| XrefError::Config(format!("{key} must be a number, got '{value}'")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(XrefError::Config(format!("{key} must be true or false, got '{value}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.sheets.api_base, "https://sheets.googleapis.com");
        assert_eq!(config.lookup.split_policy, AltSplitPolicy::Strict);
        assert!(config.lookup.cross_family_filter);
    }

    #[test]
    fn test_toml_sections_are_optional() {
        let config = Config::from_toml_str(
            r#"
            [sheets]
            spreadsheet_id = "abc"
            timeout_seconds = 5

            [lookup]
            split_policy = "legacy"
            "#,
        )
        .unwrap();
        assert_eq!(config.sheets.spreadsheet_id.as_deref(), Some("abc"));
        assert_eq!(config.sheets.timeout_seconds, 5);
        assert_eq!(config.lookup.split_policy, AltSplitPolicy::Legacy);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::from_toml_str("[server]\nport = 9000\n").unwrap();
        config
            .apply_overrides(env(&[
                ("PORT", "8080"),
                ("GOOGLE_SHEETS_ID", "sheet"),
                ("XREF_CROSS_FILTER", "off"),
                ("XREF_DATA_FILE", "parts.json"),
                ("GOOGLE_SERVICE_ACCOUNT_FILE", "service-account-key.json"),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sheets.spreadsheet_id.as_deref(), Some("sheet"));
        assert!(!config.lookup.cross_family_filter);
        assert_eq!(config.sheets.data_file, Some(PathBuf::from("parts.json")));
        assert_eq!(
            config.sheets.service_account_file,
            Some(PathBuf::from("service-account-key.json"))
        );
    }

    #[test]
    fn test_bad_override_is_config_error() {
        let mut config = Config::default();
        let err = config.apply_overrides(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, XrefError::Config(_)));

        let err = config.apply_overrides(env(&[("XREF_SPLIT_POLICY", "fuzzy")])).unwrap_err();
        assert!(matches!(err, XrefError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let mut config = Config::default();
        config.sheets.api_key = Some("super-secret".into());
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
