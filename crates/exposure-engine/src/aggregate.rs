//! Breach record aggregation.
//!
//! Turns the raw candidate hits of a lookup into the canonical record list of an
//! [`ExposureReport`](crate::ExposureReport): one record per breach `id`, ordered newest first.
//! The ordering is relied upon by timeline views, so it must be identical across repeated calls
//! with the same input regardless of the input order.

use std::{
    cmp::Ordering,
    collections::{hash_map::Entry, HashMap},
};

use crate::report::BreachRecord;

/// Deduplicate and sort raw breach records.
///
/// When several records share an `id`, the one with the most populated descriptive fields is
/// kept. The result is sorted by `first_seen_date` descending (undated records last), then by
/// `name` ascending. Applying this function to its own output returns the output unchanged.
pub fn aggregate(records: impl IntoIterator<Item = BreachRecord>) -> Vec<BreachRecord> {
    let mut by_id: HashMap<String, BreachRecord> = HashMap::new();

    for record in records {
        match by_id.entry(record.id.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(record);
            }
            Entry::Occupied(mut entry) => {
                if preference(&record, entry.get()) == Ordering::Greater {
                    entry.insert(record);
                }
            }
        }
    }

    let mut records: Vec<BreachRecord> = by_id.into_values().collect();
    records.sort_by(timeline_order);
    records
}

/// `Greater` when `a` should be kept over `b`.
fn preference(a: &BreachRecord, b: &BreachRecord) -> Ordering {
    a.populated_fields()
        .cmp(&b.populated_fields())
        .then_with(|| b.id.cmp(&a.id))
        .then_with(|| tie_break_key(b).cmp(&tie_break_key(a)))
}

#[allow(clippy::type_complexity)]
fn tie_break_key(
    record: &BreachRecord,
) -> (
    &str,
    Option<chrono::NaiveDate>,
    Option<u64>,
    Option<&str>,
    Option<&str>,
    Option<&str>,
    Option<&str>,
    Option<&str>,
) {
    (
        record.name.as_str(),
        record.first_seen_date,
        record.exposed_record_count,
        record.domain.as_deref(),
        record.industry.as_deref(),
        record.reference_url.as_deref(),
        record.logo_url.as_deref(),
        record.description.as_deref(),
    )
}

fn timeline_order(a: &BreachRecord, b: &BreachRecord) -> Ordering {
    let by_date = match (a.first_seen_date, b.first_seen_date) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_date
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}
