//! Short-lived report cache with request collapsing.
//!
//! Concurrent requests for the same [`LookupKey`] share one resolution. The cache only holds a
//! weak handle to an in-flight resolution: once every caller awaiting it has been dropped, the
//! resolution and its pending corpus request are dropped too, and the next caller starts over.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Utc};
use futures::{
    future::{BoxFuture, WeakShared},
    FutureExt,
};
use tracing::{debug, instrument};

use crate::{
    aggregate::aggregate,
    clock::{Clock, SystemClock},
    credential::{normalize, Credential, LookupKey},
    error::ResolveError,
    lookup::LookupClient,
    report::ExposureReport,
    risk::{summarize, RiskThresholds},
};

type Resolution = BoxFuture<'static, Result<ExposureReport, ResolveError>>;

/// Default time a report stays cached.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

struct CachedReport {
    report: ExposureReport,
    stored_at: DateTime<Utc>,
}

struct InFlight {
    generation: u64,
    resolution: WeakShared<Resolution>,
}

#[derive(Default)]
struct CacheState {
    reports: HashMap<LookupKey, CachedReport>,
    in_flight: HashMap<LookupKey, InFlight>,
    next_generation: u64,
}

impl CacheState {
    /// Return the cached report if it is younger than `ttl`, evicting it otherwise.
    fn fresh(
        &mut self,
        key: &LookupKey,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<ExposureReport> {
        let cached = self.reports.get(key)?;
        let fresh = (now - cached.stored_at)
            .to_std()
            // A clock that moved backwards still counts as fresh
            .map_or(true, |age| age < ttl);
        if fresh {
            return Some(cached.report.clone());
        }

        debug!(%key, "Evicting expired report");
        self.reports.remove(key);
        None
    }

    /// Remove the in-flight marker of `key` if it still belongs to `generation`.
    fn release(&mut self, key: &LookupKey, generation: u64) {
        if self
            .in_flight
            .get(key)
            .is_some_and(|in_flight| in_flight.generation == generation)
        {
            self.in_flight.remove(key);
        }
    }

    fn complete(
        &mut self,
        key: LookupKey,
        generation: u64,
        result: &Result<ExposureReport, ResolveError>,
    ) {
        self.release(&key, generation);

        // Failures are never cached
        if let Ok(report) = result {
            self.reports.insert(
                key,
                CachedReport {
                    report: report.clone(),
                    stored_at: report.resolved_at,
                },
            );
        }
    }
}

/// Owned by a resolution future. Releases the in-flight marker when the resolution is dropped
/// before completing, so abandoned keys do not accumulate.
struct InFlightMarker {
    state: Arc<Mutex<CacheState>>,
    key: LookupKey,
    generation: u64,
}

impl Drop for InFlightMarker {
    fn drop(&mut self) {
        // Skipped on a poisoned lock
        if let Ok(mut state) = self.state.lock() {
            state.release(&self.key, self.generation);
        }
    }
}

/// Memoizes exposure reports per [`LookupKey`] and runs the resolution pipeline on a miss.
pub struct ReportCache {
    lookup: LookupClient,
    thresholds: RiskThresholds,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: Arc<Mutex<CacheState>>,
}

impl ReportCache {
    /// Create an empty cache using the system clock.
    pub fn new(lookup: LookupClient, thresholds: RiskThresholds, ttl: Duration) -> Self {
        Self {
            lookup,
            thresholds,
            clock: Arc::new(SystemClock),
            ttl,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    /// Replace the clock used for expiry and report timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Return the report for `credential`, resolving it against the corpus on a cache miss.
    ///
    /// The credential is normalized and dropped before anything else happens, so an invalid
    /// credential never reaches the corpus.
    pub async fn get_or_resolve(
        &self,
        credential: Credential,
    ) -> Result<ExposureReport, ResolveError> {
        let key = normalize(credential)?;
        self.get_or_resolve_key(key).await
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn get_or_resolve_key(&self, key: LookupKey) -> Result<ExposureReport, ResolveError> {
        let resolution = {
            let mut state = self.state.lock().expect("Mutex is not poisoned");

            if let Some(report) = state.fresh(&key, self.clock.now(), self.ttl) {
                debug!("Serving cached report");
                return Ok(report);
            }

            match state
                .in_flight
                .get(&key)
                .and_then(|in_flight| in_flight.resolution.upgrade())
            {
                Some(resolution) => {
                    debug!("Joining in-flight resolution");
                    resolution
                }
                None => {
                    let generation = state.next_generation;
                    state.next_generation += 1;

                    let resolution = self.resolve(key.clone(), generation).boxed().shared();
                    let weak = resolution
                        .downgrade()
                        .expect("An unpolled resolution can always be downgraded");
                    state.in_flight.insert(
                        key,
                        InFlight {
                            generation,
                            resolution: weak,
                        },
                    );
                    resolution
                }
            }
        };

        resolution.await
    }

    /// Build the resolution future. It clears its own in-flight marker and stores its report.
    fn resolve(
        &self,
        key: LookupKey,
        generation: u64,
    ) -> impl std::future::Future<Output = Result<ExposureReport, ResolveError>> + Send + 'static
    {
        let lookup = self.lookup.clone();
        let thresholds = self.thresholds;
        let clock = self.clock.clone();
        let state = self.state.clone();

        let marker = InFlightMarker {
            state: state.clone(),
            key: key.clone(),
            generation,
        };

        async move {
            let _marker = marker;
            let result = build_report(&lookup, thresholds, clock.as_ref(), key.clone()).await;
            state
                .lock()
                .expect("Mutex is not poisoned")
                .complete(key, generation, &result);
            result
        }
    }

    /// Drop the cached report for `key`, if any. In-flight resolutions are unaffected.
    pub fn invalidate(&self, key: &LookupKey) {
        self.state
            .lock()
            .expect("Mutex is not poisoned")
            .reports
            .remove(key);
    }

    /// Drop every cached report.
    pub fn clear(&self) {
        self.state
            .lock()
            .expect("Mutex is not poisoned")
            .reports
            .clear();
    }

    /// Number of cached reports, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .expect("Mutex is not poisoned")
            .reports
            .len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.state
            .lock()
            .expect("Mutex is not poisoned")
            .in_flight
            .len()
    }

    /// Whether a fresh report for `key` is cached.
    pub fn contains(&self, key: &LookupKey) -> bool {
        self.state
            .lock()
            .expect("Mutex is not poisoned")
            .fresh(key, self.clock.now(), self.ttl)
            .is_some()
    }
}

async fn build_report(
    lookup: &LookupClient,
    thresholds: RiskThresholds,
    clock: &dyn Clock,
    key: LookupKey,
) -> Result<ExposureReport, ResolveError> {
    let raw = lookup.lookup(&key).await?;

    // Every matching corpus entry is an exposure, even when several describe the same breach
    let total_exposures = raw.len();
    let records = aggregate(raw);
    let risk_tier = thresholds.classify(total_exposures);
    let summary = summarize(&records, risk_tier);

    Ok(ExposureReport {
        query_key: key,
        records,
        total_exposures,
        risk_tier,
        resolved_at: clock.now(),
        summary,
    })
}
