use thiserror::Error;

#[derive(Error, Debug)]
pub enum XrefError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Google authentication failed: {0}")]
    Auth(#[from] gcp_auth::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Spreadsheet fetch failed: {message}")]
    Fetch { message: String },

    #[error("Failed to get data from table")]
    NoData,

    #[error("Part number not specified")]
    EmptyQuery,

    #[error("Part number prefix must be at least {min} characters")]
    PrefixTooShort { min: usize },
}

impl XrefError {
    /// Errors caused by the caller's input rather than by the data source.
    pub fn is_client_error(&self) -> bool {
        matches!(self, XrefError::EmptyQuery | XrefError::PrefixTooShort { .. })
    }
}

pub type Result<T> = std::result::Result<T, XrefError>;
