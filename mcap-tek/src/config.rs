use std::{path::PathBuf, time::Duration};

use url::Url;

use crate::{error::ConfigError, spring::SpringConfig};

/// Local development API.
pub const DEV_API_BASE: &str = "http://localhost:3001";

/// Production API.
pub const PROD_API_BASE: &str = "https://mcaptek.onrender.com";

/// Token address offered by the Copy button.
pub const COIN_ADDRESS: &str = "...pump";

/// Runtime configuration for the widget.
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL, without the `/api/marketcap` path
    pub api_base: Url,
    /// Time between market-cap polls
    pub poll_interval: Duration,
    /// Optional per-request timeout (transport default when `None`)
    pub request_timeout: Option<Duration>,
    /// JSON file holding persisted widget state
    pub state_file: PathBuf,
    /// Address copied to the clipboard
    pub coin_address: String,
    /// Displayed value smoothing
    pub spring: SpringConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            poll_interval: Duration::from_millis(2000),
            request_timeout: None,
            state_file: PathBuf::from(".mcap-tek-state.json"),
            coin_address: COIN_ADDRESS.to_string(),
            spring: SpringConfig::default(),
        }
    }
}

impl Config {
    /// Build from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// - `MCAP_API_BASE`: API base URL (blank means unset)
    /// - `MCAP_POLL_INTERVAL_MS`: poll interval in milliseconds
    /// - `MCAP_STATE_FILE`: persisted state path
    /// - `MCAP_COIN_ADDRESS`: address for the Copy button
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(base) = var("MCAP_API_BASE") {
            config = config.with_api_base(&base)?;
        }

        if let Some(raw) = var("MCAP_POLL_INTERVAL_MS") {
            let ms = raw
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::Interval {
                    name: "MCAP_POLL_INTERVAL_MS",
                    value: raw.clone(),
                })?;
            config = config.with_poll_interval(Duration::from_millis(ms));
        }

        if let Some(path) = var("MCAP_STATE_FILE") {
            config = config.with_state_file(path);
        }

        if let Some(address) = var("MCAP_COIN_ADDRESS") {
            config.coin_address = address;
        }

        Ok(config)
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base: &str) -> Result<Self, ConfigError> {
        self.api_base = parse_base(base)?;
        Ok(self)
    }

    /// Set poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set persisted state path
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }

    /// Market-cap endpoint, before cache busting.
    pub fn market_cap_url(&self) -> Url {
        let mut url = self.api_base.clone();
        let path = format!("{}/api/marketcap", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url
    }
}

fn default_api_base() -> Url {
    let base = if cfg!(debug_assertions) {
        DEV_API_BASE
    } else {
        PROD_API_BASE
    };
    Url::parse(base).expect("built-in API base is a valid URL")
}

fn parse_base(base: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(base).map_err(|source| ConfigError::BaseUrl {
        url: base.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Scheme(other.to_string())),
    }
}
