use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    credential::LookupKey,
    risk::{ExposureSummary, RiskTier},
};

/// Metadata about a single breach, as reported by the corpus provider.
///
/// Identity is `id`. Every other field is descriptive and may be missing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BreachRecord {
    /// Stable identifier assigned by the corpus source.
    pub id: String,
    /// Display name of the breached service.
    #[serde(default)]
    pub name: String,
    /// Date the breach was first observed.
    #[serde(default)]
    pub first_seen_date: Option<NaiveDate>,
    /// Number of accounts exposed in the breach.
    #[serde(default)]
    pub exposed_record_count: Option<u64>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub domain: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub industry: Option<String>,
    /// Link to a write-up of the breach.
    #[serde(default)]
    pub reference_url: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub logo_url: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub description: Option<String>,
}

impl BreachRecord {
    /// Number of descriptive fields carrying a value. Blank strings count as missing.
    pub fn populated_fields(&self) -> usize {
        let text = [
            Some(self.name.as_str()),
            self.domain.as_deref(),
            self.industry.as_deref(),
            self.reference_url.as_deref(),
            self.logo_url.as_deref(),
            self.description.as_deref(),
        ];

        text.iter()
            .filter(|value| value.is_some_and(|v| !v.trim().is_empty()))
            .count()
            + usize::from(self.first_seen_date.is_some())
            + usize::from(self.exposed_record_count.is_some())
    }
}

/// The aggregated result of checking one credential.
///
/// Never contains the raw credential, only its one-way [`LookupKey`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExposureReport {
    #[allow(missing_docs)]
    pub query_key: LookupKey,
    /// Deduplicated breaches, newest first, ties by name.
    pub records: Vec<BreachRecord>,
    /// Number of matching corpus entries before deduplication. At least `records.len()`.
    pub total_exposures: usize,
    /// Classified from `total_exposures`.
    pub risk_tier: RiskTier,
    /// When the corpus lookup completed.
    pub resolved_at: DateTime<Utc>,
    #[allow(missing_docs)]
    pub summary: ExposureSummary,
}

impl ExposureReport {
    /// Whether any breach was found.
    pub fn is_breached(&self) -> bool {
        !self.records.is_empty()
    }
}
