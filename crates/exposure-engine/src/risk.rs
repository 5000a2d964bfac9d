//! Risk classification and report summaries.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{error::InvalidSettingsError, report::BreachRecord};

/// Coarse severity of an exposure, ordered from least to most severe.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    /// Not found in any breach.
    Safe,
    #[allow(missing_docs)]
    Low,
    #[allow(missing_docs)]
    Moderate,
    #[allow(missing_docs)]
    Severe,
}

/// Lower bounds (inclusive) of each non-safe tier, in number of exposures.
///
/// Zero exposures is always [`RiskTier::Safe`]. Valid thresholds satisfy
/// `1 <= low < moderate < severe`, which keeps the classification total and monotone.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RiskThresholds {
    #[allow(missing_docs)]
    pub low: usize,
    #[allow(missing_docs)]
    pub moderate: usize,
    #[allow(missing_docs)]
    pub severe: usize,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: 1,
            moderate: 3,
            severe: 10,
        }
    }
}

impl RiskThresholds {
    /// Check that the bands are increasing and that only zero exposures map to SAFE.
    pub fn validate(&self) -> Result<(), InvalidSettingsError> {
        if self.low >= 1 && self.low < self.moderate && self.moderate < self.severe {
            Ok(())
        } else {
            Err(InvalidSettingsError::RiskThresholds {
                low: self.low,
                moderate: self.moderate,
                severe: self.severe,
            })
        }
    }

    /// Map an exposure count to its tier.
    pub fn classify(&self, count: usize) -> RiskTier {
        if count >= self.severe {
            RiskTier::Severe
        } else if count >= self.moderate {
            RiskTier::Moderate
        } else if count >= self.low && count > 0 {
            RiskTier::Low
        } else {
            RiskTier::Safe
        }
    }
}

/// Classify a record list with the default thresholds, one exposure per record.
pub fn classify(records: &[BreachRecord]) -> RiskTier {
    RiskThresholds::default().classify(records.len())
}

/// Human-relevant counts derived from an aggregated record list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExposureSummary {
    /// Number of distinct breaches.
    pub breach_count: usize,
    /// Sum of the exposed account counts of all breaches that report one.
    pub exposed_record_total: u64,
    #[allow(missing_docs)]
    pub most_recent_breach: Option<NaiveDate>,
    #[allow(missing_docs)]
    pub oldest_breach: Option<NaiveDate>,
    /// Distinct industries, sorted.
    pub industries: Vec<String>,
    /// Steps to secure the account. Empty when nothing was found.
    pub recommendations: Vec<String>,
}

const RECOMMENDATIONS: &[&str] = &[
    "Change your password immediately.",
    "Enable two-factor authentication (2FA).",
    "Use a strong and unique password for every account, ideally with a password manager.",
    "Monitor your accounts for suspicious logins and activity.",
    "Be cautious of phishing emails and links.",
];

/// Build the summary of an aggregated record list.
pub fn summarize(records: &[BreachRecord], tier: RiskTier) -> ExposureSummary {
    let dates = records.iter().filter_map(|r| r.first_seen_date);
    let industries: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.industry.as_deref())
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .collect();

    let recommendations = if tier == RiskTier::Safe {
        Vec::new()
    } else {
        RECOMMENDATIONS.iter().map(|r| r.to_string()).collect()
    };

    ExposureSummary {
        breach_count: records.len(),
        exposed_record_total: records
            .iter()
            .filter_map(|r| r.exposed_record_count)
            .fold(0u64, u64::saturating_add),
        most_recent_breach: dates.clone().max(),
        oldest_breach: dates.min(),
        industries: industries.into_iter().map(str::to_string).collect(),
        recommendations,
    }
}
