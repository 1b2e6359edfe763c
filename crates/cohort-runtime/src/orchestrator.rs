//! Async refresh orchestrator.
//!
//! Drives a [`SnapshotCache`] in a tokio task, sending periodic
//! [`DashboardData`] snapshots through an `mpsc` channel so the TUI event
//! loop can consume them without any shared mutable state.

use std::path::PathBuf;
use std::time::Duration;

use cohort_core::coerce::ParsePolicy;
use cohort_data::analysis::CohortAnalysis;
use tokio::sync::mpsc;
use tokio::time;

use crate::snapshot::{SnapshotCache, DEFAULT_CACHE_TTL_SECS};

// ── Public types ──────────────────────────────────────────────────────────────

/// A single dashboard snapshot forwarded to the TUI layer.
///
/// This is the primary data contract between the background runtime and the
/// presentation layer.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// Full analysis result from the data pipeline.
    pub analysis: CohortAnalysis,
    /// Error from the most recent fetch attempt, if the snapshot is stale.
    pub last_error: Option<String>,
}

// ── RefreshOrchestrator ───────────────────────────────────────────────────────

/// Background refresh coordinator.
///
/// Call [`RefreshOrchestrator::start`] to spin up the refresh loop in a
/// dedicated tokio task and receive a channel endpoint for [`DashboardData`]
/// updates.
pub struct RefreshOrchestrator {
    /// How often to refresh the analysis.
    update_interval: Duration,
    /// Optional override for the cohort CSV path.
    data_path: Option<PathBuf>,
    /// Cell-coercion policy forwarded to the loader.
    policy: ParsePolicy,
    /// Month labels restricting the funnel. Empty keeps all rows.
    month_filter: Vec<String>,
}

impl RefreshOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Parameters
    /// - `update_interval_secs` – seconds between dashboard refreshes.
    /// - `data_path`            – optional CSV path override.
    /// - `policy`               – cell-coercion policy.
    /// - `month_filter`         – month labels restricting the funnel.
    pub fn new(
        update_interval_secs: u64,
        data_path: Option<PathBuf>,
        policy: ParsePolicy,
        month_filter: Vec<String>,
    ) -> Self {
        Self {
            update_interval: Duration::from_secs(update_interval_secs),
            data_path,
            policy,
            month_filter,
        }
    }

    /// Start the refresh loop.
    ///
    /// Spawns a tokio task that runs the refresh loop. Returns:
    /// - An `mpsc::Receiver<DashboardData>` for the caller to poll.
    /// - A [`RefreshHandle`] that can be used to abort the loop.
    pub fn start(self) -> (mpsc::Receiver<DashboardData>, RefreshHandle) {
        // Buffer a modest number of snapshots so slow consumers don't stall the loop.
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.refresh_loop(tx).await;
        });

        (rx, RefreshHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// The main refresh loop.
    ///
    /// Performs an immediate fetch on startup, then repeats on `update_interval`.
    /// The loop exits when the receiver side of the channel is closed.
    async fn refresh_loop(self, tx: mpsc::Sender<DashboardData>) {
        let mut cache = SnapshotCache::new(
            DEFAULT_CACHE_TTL_SECS,
            self.data_path.clone(),
            self.policy,
            self.month_filter.clone(),
        );

        // Initial fetch (force refresh to populate immediately).
        self.fetch_and_send(&mut cache, &tx, true).await;

        let mut interval = time::interval(self.update_interval);
        // Consume the first tick which fires immediately; we already fetched above.
        interval.tick().await;

        loop {
            interval.tick().await;

            if tx.is_closed() {
                tracing::debug!("refresh channel closed; exiting loop");
                break;
            }

            self.fetch_and_send(&mut cache, &tx, false).await;
        }
    }

    /// Fetch fresh data and send a [`DashboardData`] snapshot to the channel.
    async fn fetch_and_send(
        &self,
        cache: &mut SnapshotCache,
        tx: &mpsc::Sender<DashboardData>,
        force: bool,
    ) {
        // Obtain the analysis (clone so we can own it for the snapshot).
        let analysis = match cache.get_data(force) {
            Some(a) => a.clone(),
            None => {
                tracing::warn!(
                    error = cache.last_error().unwrap_or("unknown"),
                    "no cohort data available; skipping send"
                );
                return;
            }
        };

        let snapshot = DashboardData {
            analysis,
            last_error: cache.last_error().map(str::to_string),
        };

        if let Err(e) = tx.send(snapshot).await {
            tracing::warn!(error = %e, "failed to send dashboard snapshot; receiver dropped");
        }
    }
}

// ── RefreshHandle ─────────────────────────────────────────────────────────────

/// A handle to the background refresh task.
///
/// Drop or call [`RefreshHandle::abort`] to stop the loop.
pub struct RefreshHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl RefreshHandle {
    /// Immediately abort the refresh loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
