//! HTTP breach corpus provider.
//!
//! Range queries are sent as `GET {base}/range/{namespace}/{PREFIX}` and answered with a JSON
//! array of `{"hash": "...", "breach": {...}}` entries.

use reqwest::{header::ACCEPT, StatusCode};

use super::{CorpusEntry, CorpusProvider};
use crate::{
    credential::CredentialKind,
    error::{CorpusRejectedError, CorpusUnavailableError, LookupError},
};

/// [`CorpusProvider`] backed by a remote range API.
#[derive(Clone, Debug)]
pub struct HttpCorpusProvider {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpCorpusProvider {
    /// Create a provider for the corpus at `base_url`. Timeouts are enforced by the caller.
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl CorpusProvider for HttpCorpusProvider {
    async fn fetch_range(
        &self,
        kind: CredentialKind,
        prefix: &str,
    ) -> Result<Vec<CorpusEntry>, LookupError> {
        let url = format!("{}/range/{}/{}", self.base_url, kind.namespace(), prefix);

        let response = self
            .http_client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        response
            .json::<Vec<CorpusEntry>>()
            .await
            .map_err(|e| transport_error(e.without_url()))
    }
}

fn transport_error(e: reqwest::Error) -> LookupError {
    if e.is_builder() {
        CorpusRejectedError::new(e.to_string()).into()
    } else {
        CorpusUnavailableError::new(e.to_string()).into()
    }
}

/// Throttling, request timeouts and server errors are transient; other client errors are not.
fn status_error(status: StatusCode) -> LookupError {
    let reason = format!("corpus responded with {status}");
    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        CorpusUnavailableError::new(reason).into()
    } else {
        CorpusRejectedError::new(reason).into()
    }
}
