#![doc = include_str!("../README.md")]

pub mod aggregate;
mod cache;
mod client;
mod clock;
pub mod credential;
pub mod error;
pub mod lookup;
mod report;
pub mod risk;
mod settings;
pub mod view;

pub use aggregate::aggregate;
pub use cache::{ReportCache, DEFAULT_CACHE_TTL};
pub use client::{CallerId, ExposureClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::{normalize, Credential, CredentialKind, LookupKey};
pub use error::{
    ClientError, CorpusRejectedError, CorpusUnavailableError, InvalidCredentialError,
    InvalidLookupKeyError, InvalidSettingsError, LookupError, ResolveError,
};
pub use lookup::{CorpusEntry, CorpusProvider, HttpCorpusProvider, LookupClient};
pub use report::{BreachRecord, ExposureReport};
pub use risk::{classify, summarize, ExposureSummary, RiskThresholds, RiskTier};
pub use settings::EngineSettings;
pub use view::{Outcome, ReportView};
