//! Privacy-preserving lookups against a breach corpus.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    credential::{CredentialKind, LookupKey},
    error::{CorpusUnavailableError, LookupError},
    report::BreachRecord,
};

mod http;
pub(crate) mod range;

pub use http::HttpCorpusProvider;
pub use range::{DEFAULT_PREFIX_LEN, MAX_PREFIX_LEN, MIN_PREFIX_LEN};

/// One candidate returned by a range query: a credential hash and the breach it appeared in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    /// Full hex digest, or only the part following the queried prefix.
    pub hash: String,
    #[allow(missing_docs)]
    pub breach: BreachRecord,
}

/// A source of breach data that answers hash-prefix range queries.
#[async_trait::async_trait]
pub trait CorpusProvider: Send + Sync {
    /// Return every entry of the `kind` corpus whose hash starts with `prefix`.
    ///
    /// Dropping the returned future must cancel any outstanding request.
    async fn fetch_range(
        &self,
        kind: CredentialKind,
        prefix: &str,
    ) -> Result<Vec<CorpusEntry>, LookupError>;
}

/// Queries a [`CorpusProvider`] using only a prefix of the lookup key.
#[derive(Clone)]
pub struct LookupClient {
    provider: Arc<dyn CorpusProvider>,
    prefix_len: usize,
    timeout: Duration,
}

impl LookupClient {
    #[allow(missing_docs)]
    pub fn new(provider: Arc<dyn CorpusProvider>, prefix_len: usize, timeout: Duration) -> Self {
        Self {
            provider,
            prefix_len,
            timeout,
        }
    }

    /// Find the raw breach records of `key`, possibly empty.
    ///
    /// The full hash never leaves this function. If the provider does not answer within the
    /// timeout, its request is dropped and [`CorpusUnavailableError`] is returned.
    #[instrument(skip_all, fields(key = %key))]
    pub async fn lookup(&self, key: &LookupKey) -> Result<Vec<BreachRecord>, LookupError> {
        let prefix = key.prefix(self.prefix_len);
        debug!(namespace = key.kind().namespace(), prefix, "Querying breach corpus");

        let candidates = tokio::time::timeout(
            self.timeout,
            self.provider.fetch_range(key.kind(), prefix),
        )
        .await
        .map_err(|_| {
            CorpusUnavailableError::new(format!(
                "no response within {} ms",
                self.timeout.as_millis()
            ))
        })??;

        let candidate_count = candidates.len();
        let records = range::filter_candidates(key, self.prefix_len, candidates);
        debug!(
            candidates = candidate_count,
            matches = records.len(),
            "Filtered corpus candidates"
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    };

    use super::*;
    use crate::{
        credential::{normalize, Credential},
        error::CorpusRejectedError,
    };

    /// Records every prefix it is asked for and answers with fixed entries.
    struct RecordingProvider {
        entries: Vec<CorpusEntry>,
        prefixes: Mutex<Vec<(CredentialKind, String)>>,
    }

    #[async_trait::async_trait]
    impl CorpusProvider for RecordingProvider {
        async fn fetch_range(
            &self,
            kind: CredentialKind,
            prefix: &str,
        ) -> Result<Vec<CorpusEntry>, LookupError> {
            self.prefixes
                .lock()
                .unwrap()
                .push((kind, prefix.to_string()));
            Ok(self.entries.clone())
        }
    }

    /// Never answers, and reports when its pending request is dropped.
    struct HangingProvider {
        started: AtomicUsize,
        dropped: Arc<AtomicBool>,
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl CorpusProvider for HangingProvider {
        async fn fetch_range(
            &self,
            _kind: CredentialKind,
            _prefix: &str,
        ) -> Result<Vec<CorpusEntry>, LookupError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let _guard = DropFlag(self.dropped.clone());
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    struct RejectingProvider;

    #[async_trait::async_trait]
    impl CorpusProvider for RejectingProvider {
        async fn fetch_range(
            &self,
            _kind: CredentialKind,
            _prefix: &str,
        ) -> Result<Vec<CorpusEntry>, LookupError> {
            Err(CorpusRejectedError::new("400 Bad Request").into())
        }
    }

    fn entry(hash: &str, id: &str) -> CorpusEntry {
        CorpusEntry {
            hash: hash.to_string(),
            breach: BreachRecord {
                id: id.to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_lookup_sends_prefix_only() {
        let provider = Arc::new(RecordingProvider {
            entries: vec![
                entry("1E4C9B93F3F0682250B6CF8331B7EE68FD8", "match"),
                entry("0018A45C4D1DEF81644B54AB7F969B88D65", "other"),
            ],
            prefixes: Mutex::new(Vec::new()),
        });
        let client = LookupClient::new(provider.clone(), 5, Duration::from_secs(5));
        let key = normalize(Credential::password("password")).unwrap();

        let records = client.lookup(&key).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "match");
        assert_eq!(
            *provider.prefixes.lock().unwrap(),
            vec![(CredentialKind::Password, "5BAA6".to_string())]
        );
    }

    #[tokio::test]
    async fn test_lookup_without_matches_is_empty() {
        let provider = Arc::new(RecordingProvider {
            entries: vec![entry("0018A45C4D1DEF81644B54AB7F969B88D65", "other")],
            prefixes: Mutex::new(Vec::new()),
        });
        let client = LookupClient::new(provider, 5, Duration::from_secs(5));
        let key = normalize(Credential::password("password")).unwrap();

        assert!(client.lookup(&key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable_and_cancels_request() {
        let dropped = Arc::new(AtomicBool::new(false));
        let provider = Arc::new(HangingProvider {
            started: AtomicUsize::new(0),
            dropped: dropped.clone(),
        });
        let client = LookupClient::new(provider.clone(), 5, Duration::from_millis(20));
        let key = normalize(Credential::email("user@example.com")).unwrap();

        let result = client.lookup(&key).await;

        assert!(matches!(result, Err(LookupError::Unavailable(_))));
        assert_eq!(provider.started.load(Ordering::SeqCst), 1);
        assert!(dropped.load(Ordering::SeqCst), "pending request was not dropped");
    }

    #[tokio::test]
    async fn test_rejection_is_passed_through() {
        let client = LookupClient::new(Arc::new(RejectingProvider), 5, Duration::from_secs(5));
        let key = normalize(Credential::email("user@example.com")).unwrap();

        let result = client.lookup(&key).await;

        assert!(matches!(result, Err(LookupError::Rejected(_))));
    }
}
