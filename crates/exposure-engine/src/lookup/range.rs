//! k-anonymity range matching.
//!
//! Only the first few hex characters of a [`LookupKey`] digest are sent to the corpus. The
//! corpus answers with every entry sharing that prefix and the exact match happens here, so the
//! provider can only learn that the credential is one of the many sharing the prefix.

use crate::{credential::LookupKey, report::BreachRecord};

use super::CorpusEntry;

/// Prefix length used when none is configured.
pub const DEFAULT_PREFIX_LEN: usize = 5;
/// Shortest supported prefix.
pub const MIN_PREFIX_LEN: usize = 1;
/// Longest supported prefix. Longer prefixes shrink the anonymity set too much.
pub const MAX_PREFIX_LEN: usize = 10;

/// Keep the breach metadata of every candidate whose hash matches `key` exactly.
pub(super) fn filter_candidates(
    key: &LookupKey,
    prefix_len: usize,
    candidates: Vec<CorpusEntry>,
) -> Vec<BreachRecord> {
    let (_, suffix) = key.split(prefix_len);

    candidates
        .into_iter()
        .filter(|candidate| candidate_matches(&candidate.hash, key.hash(), suffix))
        .map(|candidate| candidate.breach)
        .collect()
}

/// Candidates may carry either the full digest or only the part after the prefix.
fn candidate_matches(candidate: &str, full_hash: &str, suffix: &str) -> bool {
    let candidate = candidate.trim();

    if candidate.len() == full_hash.len() {
        candidate.eq_ignore_ascii_case(full_hash)
    } else if candidate.len() == suffix.len() {
        candidate.eq_ignore_ascii_case(suffix)
    } else {
        false
    }
}
