//! Errors that can occur when resolving an exposure report.
//!
//! None of these types carry the raw credential value. Messages only ever name the credential
//! kind, the hash prefix or a description of the provider failure.

use thiserror::Error;

use crate::credential::CredentialKind;

/// The submitted credential cannot be turned into a lookup key. Not retried by the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidCredentialError {
    /// The value was empty, or only whitespace.
    #[error("The {0} must not be empty")]
    Empty(CredentialKind),
    /// The email address is missing an `@`, a local part or a domain part.
    #[error("The email address is malformed")]
    MalformedEmail,
}

/// A serialized [`crate::LookupKey`] does not hold a full hex digest.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("A lookup key must be a 40 character hex digest")]
pub struct InvalidLookupKeyError;

/// Transient provider or network failure. The caller may retry with backoff.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("The breach corpus is unavailable: {reason}")]
pub struct CorpusUnavailableError {
    /// Description of the failure, never containing the request URL.
    pub reason: String,
}

/// The provider permanently refused the request, e.g. a malformed prefix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("The breach corpus rejected the request: {reason}")]
pub struct CorpusRejectedError {
    /// Description of the failure, never containing the request URL.
    pub reason: String,
}

impl CorpusUnavailableError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl CorpusRejectedError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors from querying the breach corpus.
#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error(transparent)]
    Unavailable(#[from] CorpusUnavailableError),
    #[error(transparent)]
    Rejected(#[from] CorpusRejectedError),
}

/// Error returned by [`crate::ExposureClient::resolve_exposure`].
///
/// A failed lookup is always surfaced as an error and never as an empty report, since "zero
/// breaches found" and "could not check" must not be confused.
#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidCredential(#[from] InvalidCredentialError),
    #[error(transparent)]
    CorpusUnavailable(#[from] CorpusUnavailableError),
    #[error(transparent)]
    CorpusRejected(#[from] CorpusRejectedError),
}

impl From<LookupError> for ResolveError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::Unavailable(e) => Self::CorpusUnavailable(e),
            LookupError::Rejected(e) => Self::CorpusRejected(e),
        }
    }
}

impl ResolveError {
    /// Whether retrying the same request later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CorpusUnavailable(_))
    }
}

/// The engine settings are inconsistent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidSettingsError {
    /// No corpus endpoint was configured.
    #[error("The corpus URL must not be empty")]
    EmptyCorpusUrl,
    /// A zero timeout would fail every lookup.
    #[error("The request timeout must be greater than zero")]
    ZeroTimeout,
    /// The prefix length is outside of the supported range.
    #[error("The hash prefix length must be between {min} and {max}, got {got}")]
    PrefixLength {
        /// Smallest allowed prefix.
        min: usize,
        /// Largest allowed prefix.
        max: usize,
        /// Configured prefix.
        got: usize,
    },
    /// Thresholds must satisfy `1 <= low < moderate < severe`.
    #[error("Risk thresholds must be increasing and start at 1 or more, got {low}/{moderate}/{severe}")]
    RiskThresholds {
        /// Lower bound of the LOW tier.
        low: usize,
        /// Lower bound of the MODERATE tier.
        moderate: usize,
        /// Lower bound of the SEVERE tier.
        severe: usize,
    },
}

/// Errors from constructing an [`crate::ExposureClient`].
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Settings(#[from] InvalidSettingsError),
    #[error("Failed to build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
