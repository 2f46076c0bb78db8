//! Configuration for the Scopus import pipeline.

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::{ImportError, ImportResult};

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the Elsevier Scopus content API.
    pub const BASE_URL: &str = "https://api.elsevier.com/content";

    /// Request timeout. The upstream defaults are unbounded enough to hang a
    /// whole import run, so the timeout is explicit and configurable.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default page size for the paginated AU-ID search.
    pub const DEFAULT_STEP_SIZE: usize = 100;

    /// Default recency cutoff: publications older than this are rejected.
    pub const DEFAULT_CUTOFF_DATE: &str = "2010-01-01";

    /// Lifetime of a meta cache entry in days. Entries older than this are
    /// lazily evicted on read.
    pub const CACHE_LIFETIME_DAYS: i64 = 30;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Scopus API key (optional; anonymous requests are heavily throttled).
    pub api_key: Option<String>,

    /// Base URL for the content API (overridable for mock servers).
    pub base_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Config {
    /// Create a new configuration with an optional API key.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: api::BASE_URL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: None,
            base_url: format!("{}/content", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("SCOPUS_API_KEY").ok();
        Ok(Self::new(api_key))
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Parameters for one pipeline run.
///
/// Validated once at pipeline construction, before any network activity.
#[derive(Debug, Clone)]
pub struct FetcherParams {
    /// Scopus ids of publications that are already persisted locally and
    /// must not be processed again.
    pub exclude_ids: HashSet<String>,

    /// Page size for the paginated author search.
    pub step_size: usize,

    /// Recency cutoff: publications published strictly before this date are
    /// rejected. A publication dated exactly on the cutoff is kept.
    pub more_recent_than: NaiveDate,

    /// Whether the per-author affiliation blacklist is applied.
    pub apply_blacklist: bool,

    /// Truncate the author list of emitted records to this many entries.
    /// Applied after the adapter output; the stored author count still
    /// reflects the full list.
    pub max_author_count: Option<usize>,
}

impl FetcherParams {
    /// Validate the parameters, failing fast on nonsense values.
    pub fn validate(&self) -> ImportResult<()> {
        if self.step_size == 0 {
            return Err(ImportError::validation("step_size", "must be greater than zero"));
        }
        if let Some(0) = self.max_author_count {
            return Err(ImportError::validation("max_author_count", "must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for FetcherParams {
    fn default() -> Self {
        Self {
            exclude_ids: HashSet::new(),
            step_size: api::DEFAULT_STEP_SIZE,
            more_recent_than: default_cutoff_date(),
            apply_blacklist: true,
            max_author_count: None,
        }
    }
}

/// The historical floor used when no explicit cutoff is given.
#[must_use]
pub fn default_cutoff_date() -> NaiveDate {
    NaiveDate::parse_from_str(api::DEFAULT_CUTOFF_DATE, "%Y-%m-%d")
        .expect("default cutoff date is a valid ISO date")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert!(!config.has_api_key());
        assert_eq!(config.base_url, api::BASE_URL);
    }

    #[test]
    fn test_config_with_api_key() {
        let config = Config::new(Some("test-key".to_string()));
        assert!(config.has_api_key());
    }

    #[test]
    fn test_params_defaults() {
        let params = FetcherParams::default();
        assert_eq!(params.step_size, 100);
        assert!(params.apply_blacklist);
        assert!(params.exclude_ids.is_empty());
        assert_eq!(params.more_recent_than.to_string(), "2010-01-01");
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_reject_zero_step_size() {
        let params = FetcherParams { step_size: 0, ..Default::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_reject_zero_max_author_count() {
        let params = FetcherParams { max_author_count: Some(0), ..Default::default() };
        assert!(params.validate().is_err());
    }
}
