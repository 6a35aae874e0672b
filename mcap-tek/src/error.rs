use thiserror::Error;

/// Failures of a single market-cap poll.
///
/// None of these are fatal: the widget logs them and keeps showing the last
/// accepted snapshot until the next scheduled tick.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error status: {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("response is missing a numeric marketCap field")]
    MissingField,

    #[error("market cap must be finite and positive, got: {0}")]
    InvalidValue(f64),
}

impl PollError {
    /// Determine if the failure came from the payload rather than the transport.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_bad_data(&self) -> bool {
        match self {
            PollError::Body(_) | PollError::MissingField | PollError::InvalidValue(_) => true,
            _ => false,
        }
    }
}

/// Failures reading or writing the persisted key-value state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file IO failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures writing to the system clipboard.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("clipboard is unavailable")]
    Unavailable,
}

/// Invalid startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base URL {url:?}: {source}")]
    BaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("API base URL must be http or https, got: {0}")]
    Scheme(String),

    #[error("invalid {name}: {value:?}")]
    Interval { name: &'static str, value: String },
}
