//! Fetch configuration
//!
//! A [`FetchConfig`] describes one pagination run: where to fetch, which
//! window, when to stop and how to read responses. It can be loaded from
//! YAML or JSON and turned into a ready [`PaginatedFetcher`].
//!
//! ```yaml
//! base_url: https://api.airqo.net/api/v2
//! path: devices/measurements
//! start_time: "2022-11-14T20:00:45.061Z"
//! end_time: "2023-11-21T20:00:45.061Z"
//! total_pages: 23
//! window_mode: rotate
//! decoder:
//!   type: meta
//! http:
//!   timeout_secs: 30
//!   max_retries: 2
//! ```

use crate::decode::DecoderConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig, Transport};
use crate::pagination::{PaginatedFetcher, Termination, WindowMode};
use crate::types::{BackoffType, TimeWindow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Top-Level Fetch Config
// ============================================================================

/// Complete configuration for one pagination run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// API base URL
    pub base_url: String,

    /// Endpoint path appended to the base URL
    #[serde(default)]
    pub path: String,

    /// Initial window start (ISO-8601)
    pub start_time: String,

    /// Initial window end (ISO-8601)
    pub end_time: String,

    /// Fetch exactly this many pages; when absent, fetch until the last page
    #[serde(default)]
    pub total_pages: Option<u32>,

    /// Safety cap when fetching until the last page
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Whether window bounds follow each response
    #[serde(default)]
    pub window_mode: WindowMode,

    /// How responses are decoded
    #[serde(default)]
    pub decoder: DecoderConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for retryable failures (0 = none)
    #[serde(default)]
    pub max_retries: u32,

    /// Backoff strategy between retries
    #[serde(default)]
    pub backoff: BackoffType,

    /// Initial backoff in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Optional client-side rate limit
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            rate_limit: None,
            headers: HashMap::new(),
        }
    }
}

impl HttpSettings {
    /// Convert into client configuration
    pub fn client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .backoff(
                self.backoff,
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            );
        if let Some(rate_limit) = &self.rate_limit {
            builder = builder.rate_limit(rate_limit.clone());
        }
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }
}

// ============================================================================
// Construction
// ============================================================================

impl FetchConfig {
    /// Minimal config for a counted run with a static window
    pub fn new(
        base_url: impl Into<String>,
        path: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            total_pages: None,
            max_pages: None,
            window_mode: WindowMode::default(),
            decoder: DecoderConfig::default(),
            http: HttpSettings::default(),
        }
    }

    /// Check required fields and the window
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::config("base_url cannot be empty"));
        }
        if self.total_pages.is_some() && self.max_pages.is_some() {
            return Err(Error::config(
                "total_pages and max_pages are mutually exclusive",
            ));
        }
        if self.total_pages.is_none()
            && self.max_pages.is_none()
            && !self.decoder.signals_last_page()
        {
            return Err(Error::config(
                "page_index decoder needs total_pages or max_pages",
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::config("http.timeout_secs must be positive"));
        }
        self.window()?;
        Ok(())
    }

    /// Initial window
    pub fn window(&self) -> Result<TimeWindow> {
        TimeWindow::parse(&self.start_time, &self.end_time)
    }

    /// Termination implied by `total_pages` / `max_pages`
    pub fn termination(&self) -> Termination {
        match self.total_pages {
            Some(total) => Termination::TotalPages(total),
            None => Termination::UntilLastPage {
                max_pages: self.max_pages,
            },
        }
    }

    /// Build a fetcher over the given transport
    pub fn build_fetcher(
        &self,
        transport: Arc<dyn Transport>,
        cancel: CancellationToken,
    ) -> Result<PaginatedFetcher> {
        self.validate()?;
        PaginatedFetcher::builder(transport, self.decoder.build())
            .base_url(&self.base_url)
            .path(&self.path)
            .window(self.window()?)
            .termination(self.termination())
            .window_mode(self.window_mode)
            .cancellation_token(cancel)
            .build()
    }

    /// Build a fetcher over a reqwest client configured from `http`
    pub fn build_http_fetcher(&self, cancel: CancellationToken) -> Result<PaginatedFetcher> {
        let client = HttpClient::with_config(self.http.client_config())?;
        self.build_fetcher(Arc::new(client), cancel)
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a config from a `.yaml`/`.yml` or `.json` file
pub fn load_config(path: impl AsRef<Path>) -> Result<FetchConfig> {
    let config = read_config(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse a config file without validating it, so overrides can complete it
pub(crate) fn read_config(path: impl AsRef<Path>) -> Result<FetchConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_json(&content)
    } else {
        parse_yaml(&content)
    }
}

/// Load a config from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<FetchConfig> {
    let config = parse_yaml(yaml)?;
    config.validate()?;
    Ok(config)
}

/// Load a config from a JSON string
pub fn load_config_from_json(json: &str) -> Result<FetchConfig> {
    let config = parse_json(json)?;
    config.validate()?;
    Ok(config)
}

fn parse_yaml(yaml: &str) -> Result<FetchConfig> {
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))
}

fn parse_json(json: &str) -> Result<FetchConfig> {
    serde_json::from_str(json)
        .map_err(|e| Error::config(format!("Failed to parse config JSON: {e}")))
}
