//! TTL-cached snapshot store for the dashboard runtime.
//!
//! Wraps [`analyze_cohorts`] with a configurable time-to-live cache and
//! transparent retry logic. Callers use [`SnapshotCache::get_data`] to obtain
//! a fresh-or-cached [`CohortAnalysis`]; the cache handles staleness checks,
//! source-file modification tracking, up to three fetch attempts with
//! increasing back-off delays, and graceful fallback to the previous snapshot
//! on transient failure.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use cohort_core::coerce::ParsePolicy;
use cohort_data::analysis::{analyze_cohorts, CohortAnalysis};
use cohort_data::reader::resolve_data_path;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5;

/// Maximum number of fetch attempts before giving up and returning stale data.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── SnapshotCache ─────────────────────────────────────────────────────────────

/// TTL-cached wrapper around the full analysis pipeline.
///
/// A cached snapshot is served while it is younger than the TTL *and* the
/// source CSV's modification time is unchanged; editing the file invalidates
/// the cache immediately regardless of age.
///
/// # Example
/// ```no_run
/// use cohort_runtime::snapshot::SnapshotCache;
/// use cohort_core::coerce::ParsePolicy;
///
/// let mut cache = SnapshotCache::new(5, None, ParsePolicy::Lenient, Vec::new());
/// if let Some(analysis) = cache.get_data(false) {
///     println!("cohorts: {}", analysis.table.len());
/// }
/// ```
pub struct SnapshotCache {
    /// Maximum age of cached data before it is considered stale.
    cache_ttl: Duration,
    /// Optional override for the cohort CSV path.
    data_path: Option<PathBuf>,
    /// Cell-coercion policy forwarded to the loader.
    policy: ParsePolicy,
    /// Month labels forwarded to the aggregation step. Empty keeps all rows.
    month_filter: Vec<String>,
    /// Most recently fetched analysis.
    cache: Option<CohortAnalysis>,
    /// When the cache was last populated.
    cache_timestamp: Option<Instant>,
    /// Source-file modification time at the last successful fetch.
    cached_mtime: Option<SystemTime>,
    /// Human-readable description of the last error encountered.
    last_error: Option<String>,
    /// When the last *successful* fetch completed.
    last_successful_fetch: Option<Instant>,
}

impl SnapshotCache {
    /// Create a new cache.
    ///
    /// # Parameters
    /// - `cache_ttl_secs` – seconds before cached data is considered stale.
    /// - `data_path`      – optional CSV path override.
    /// - `policy`         – cell-coercion policy for loads.
    /// - `month_filter`   – month labels restricting the funnel (empty keeps all).
    pub fn new(
        cache_ttl_secs: u64,
        data_path: Option<PathBuf>,
        policy: ParsePolicy,
        month_filter: Vec<String>,
    ) -> Self {
        Self {
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            data_path,
            policy,
            month_filter,
            cache: None,
            cache_timestamp: None,
            cached_mtime: None,
            last_error: None,
            last_successful_fetch: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return analysis data, using the cache when it is still valid.
    ///
    /// When `force_refresh` is `true` the cache is bypassed and a fresh fetch
    /// is always attempted. On fetch failure the previous snapshot (if any)
    /// is returned as a best-effort fallback.
    ///
    /// The fetch is retried up to [`MAX_RETRY_ATTEMPTS`] times with
    /// increasing back-off delays (0 ms → 100 ms → 200 ms).
    pub fn get_data(&mut self, force_refresh: bool) -> Option<&CohortAnalysis> {
        if !force_refresh && self.is_cache_valid() {
            tracing::debug!("returning cached cohort analysis");
            return self.cache.as_ref();
        }

        match self.fetch_with_retry() {
            Ok(analysis) => {
                tracing::debug!(
                    rows = analysis.table.len(),
                    steps = analysis.funnel.steps.len(),
                    "analysis cache updated"
                );
                self.cached_mtime = self.source_mtime();
                self.cache = Some(analysis);
                self.cache_timestamp = Some(Instant::now());
                self.last_successful_fetch = Some(Instant::now());
                self.last_error = None;
                self.cache.as_ref()
            }
            Err(e) => {
                tracing::warn!(error = %e, "fetch failed; falling back to cached data");
                self.last_error = Some(e);
                // Return whatever we have, even if stale.
                self.cache.as_ref()
            }
        }
    }

    /// Change the month restriction and discard the cached snapshot.
    pub fn set_month_filter(&mut self, month_filter: Vec<String>) {
        if self.month_filter != month_filter {
            self.month_filter = month_filter;
            self.invalidate_cache();
        }
    }

    /// Discard the current cache, forcing the next [`get_data`] call to fetch.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        self.cached_mtime = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current cache entry, or `None` if no data has been fetched.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Human-readable description of the last fetch error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// `true` when the cache holds data within its TTL and the source file
    /// has not been modified since it was read.
    fn is_cache_valid(&self) -> bool {
        match (self.cache.as_ref(), self.cache_timestamp) {
            (Some(_), Some(ts)) => {
                ts.elapsed() < self.cache_ttl && self.source_mtime() == self.cached_mtime
            }
            _ => false,
        }
    }

    /// Modification time of the source CSV, or `None` when unavailable.
    fn source_mtime(&self) -> Option<SystemTime> {
        let path = resolve_data_path(self.data_path.as_deref());
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    /// Attempt up to [`MAX_RETRY_ATTEMPTS`] fetches with increasing back-off.
    ///
    /// Back-off schedule: attempt 1 → 0 ms, attempt 2 → 100 ms, attempt 3 → 200 ms.
    fn fetch_with_retry(&mut self) -> Result<CohortAnalysis, String> {
        let mut last_err = String::new();

        for attempt in 0..MAX_RETRY_ATTEMPTS {
            // Back-off: 0, 100, 200 ms.
            if attempt > 0 {
                let sleep_ms = (attempt as u64) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying fetch after back-off");
                thread::sleep(Duration::from_millis(sleep_ms));
            }

            match self.fetch_fresh() {
                Ok(analysis) => return Ok(analysis),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "fetch attempt failed");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }

    /// Call the analysis pipeline with this cache's configuration.
    fn fetch_fresh(&self) -> Result<CohortAnalysis, String> {
        analyze_cohorts(
            self.data_path.as_deref(),
            self.policy,
            &self.month_filter,
        )
        .map_err(|e| e.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
