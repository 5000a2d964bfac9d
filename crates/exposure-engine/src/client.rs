use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    cache::ReportCache,
    clock::{Clock, SystemClock},
    credential::Credential,
    error::{ClientError, InvalidSettingsError, ResolveError},
    lookup::{CorpusProvider, HttpCorpusProvider, LookupClient},
    report::ExposureReport,
    settings::EngineSettings,
};

/// Identity of an already-authenticated caller. Only used for tracing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CallerId(pub Uuid);

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Entry point of the engine: resolves credentials into exposure reports.
///
/// Cloning is cheap and clones share the same report cache.
#[derive(Clone)]
pub struct ExposureClient {
    cache: Arc<ReportCache>,
}

impl ExposureClient {
    /// Create a client that queries the HTTP corpus configured in `settings`.
    pub fn new(settings: EngineSettings) -> Result<Self, ClientError> {
        settings.validate()?;

        let http_client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.request_timeout())
            .build()?;
        let provider = HttpCorpusProvider::new(http_client, settings.corpus_url.as_str());

        Ok(Self::with_provider(
            &settings,
            Arc::new(provider),
            Arc::new(SystemClock),
        )?)
    }

    /// Create a client on top of any corpus provider and clock.
    pub fn with_provider(
        settings: &EngineSettings,
        provider: Arc<dyn CorpusProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, InvalidSettingsError> {
        settings.validate()?;

        let lookup = LookupClient::new(
            provider,
            settings.prefix_length,
            settings.request_timeout(),
        );
        let cache = ReportCache::new(lookup, settings.risk_thresholds, settings.cache_ttl())
            .with_clock(clock);

        Ok(Self {
            cache: Arc::new(cache),
        })
    }

    /// Resolve `credential` into an exposure report.
    ///
    /// Reports are served from the cache when fresh, and concurrent calls for the same credential
    /// share a single corpus lookup. Lookup failures are returned as errors, never as an empty
    /// report.
    #[instrument(skip_all, fields(kind = %credential.kind(), caller = ?caller))]
    pub async fn resolve_exposure(
        &self,
        credential: Credential,
        caller: Option<CallerId>,
    ) -> Result<ExposureReport, ResolveError> {
        let result = self.cache.get_or_resolve(credential).await;

        match &result {
            Ok(report) => info!(
                risk_tier = ?report.risk_tier,
                total_exposures = report.total_exposures,
                "Resolved exposure report"
            ),
            Err(e) => warn!(retryable = e.is_retryable(), "Failed to resolve exposure: {e}"),
        }

        result
    }

    /// The report cache backing this client.
    pub fn cache(&self) -> &ReportCache {
        &self.cache
    }
}
