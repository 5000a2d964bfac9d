use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    cache::DEFAULT_CACHE_TTL,
    error::InvalidSettingsError,
    lookup::{DEFAULT_PREFIX_LEN, MAX_PREFIX_LEN, MIN_PREFIX_LEN},
    risk::RiskThresholds,
};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Engine configuration. Everything except the corpus URL has a default.
///
/// ```
/// # use exposure_engine::EngineSettings;
/// let settings: EngineSettings =
///     serde_json::from_str(r#"{ "corpusUrl": "https://corpus.example.com", "cacheTtlSecs": 60 }"#)
///         .unwrap();
///
/// assert_eq!(settings.request_timeout_ms, 5000);
/// assert_eq!(settings.prefix_length, 5);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineSettings {
    /// Base URL of the breach corpus range API.
    pub corpus_url: String,
    /// Upper bound for a single corpus request, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// How long a resolved report is served from the cache, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Number of hex characters of the credential hash sent to the corpus.
    #[serde(default = "default_prefix_length")]
    pub prefix_length: usize,
    #[allow(missing_docs)]
    #[serde(default)]
    pub risk_thresholds: RiskThresholds,
    /// The `User-Agent` sent to the corpus.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL.as_secs()
}

fn default_prefix_length() -> usize {
    DEFAULT_PREFIX_LEN
}

fn default_user_agent() -> String {
    format!("exposure-engine/{}", env!("CARGO_PKG_VERSION"))
}

impl EngineSettings {
    /// Settings for the corpus at `corpus_url`, with every other value defaulted.
    pub fn new(corpus_url: impl Into<String>) -> Self {
        Self {
            corpus_url: corpus_url.into(),
            request_timeout_ms: default_request_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            prefix_length: default_prefix_length(),
            risk_thresholds: RiskThresholds::default(),
            user_agent: default_user_agent(),
        }
    }

    #[allow(missing_docs)]
    pub fn validate(&self) -> Result<(), InvalidSettingsError> {
        if self.corpus_url.trim().is_empty() {
            return Err(InvalidSettingsError::EmptyCorpusUrl);
        }
        if self.request_timeout_ms == 0 {
            return Err(InvalidSettingsError::ZeroTimeout);
        }
        if !(MIN_PREFIX_LEN..=MAX_PREFIX_LEN).contains(&self.prefix_length) {
            return Err(InvalidSettingsError::PrefixLength {
                min: MIN_PREFIX_LEN,
                max: MAX_PREFIX_LEN,
                got: self.prefix_length,
            });
        }
        self.risk_thresholds.validate()
    }

    #[allow(missing_docs)]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[allow(missing_docs)]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
