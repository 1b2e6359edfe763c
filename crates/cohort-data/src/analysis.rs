//! Main analysis pipeline for Cohort Dash.
//!
//! Orchestrates loading, normalization, and funnel aggregation, returning a
//! [`CohortAnalysis`] ready for the UI layer.

use std::path::Path;

use chrono::Utc;
use cohort_core::coerce::ParsePolicy;
use cohort_core::error::Result;
use cohort_core::models::{columns, CohortTable};

use crate::aggregator::{aggregate_funnel, FunnelSummary};
use crate::reader::{load_cohort_table, resolve_data_path};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Path of the CSV that was analysed.
    pub source_path: String,
    /// Number of cohort rows processed.
    pub rows_processed: usize,
    /// Number of numeric columns present in the source.
    pub columns_present: usize,
    /// Wall-clock seconds spent loading and normalizing the CSV.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent aggregating.
    pub aggregate_time_seconds: f64,
}

/// Headline statistics for the overview screen, in presentation units.
#[derive(Debug, Clone, Default)]
pub struct OverviewStats {
    pub cohort_count: usize,
    pub mean_client_ltv: Option<f64>,
    pub mean_tenure_months: Option<f64>,
    /// Mean conversion rate in percentage points.
    pub mean_conversion_pct: Option<f64>,
    pub mean_new_clients: Option<f64>,
}

/// The complete output of [`analyze_cohorts`].
#[derive(Debug, Clone)]
pub struct CohortAnalysis {
    /// The normalized table (views render per-cohort rows from it).
    pub table: CohortTable,
    /// Aggregated default funnel, honouring the month filter.
    pub funnel: FunnelSummary,
    /// Distinct cohort months in file order.
    pub months: Vec<String>,
    /// Distinct cohort labels in file order.
    pub cohort_labels: Vec<String>,
    /// Headline statistics over the full table (never month-filtered).
    pub overview: OverviewStats,
    /// Metadata about this analysis run.
    pub metadata: AnalysisMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full analysis pipeline.
///
/// 1. Resolve the data path and load the cohort CSV under `policy`.
/// 2. Aggregate the default funnel, restricted to the `month_filter` set
///    (empty means no restriction).
/// 3. Compute headline overview statistics over the full table.
/// 4. Return a [`CohortAnalysis`].
pub fn analyze_cohorts(
    data_path: Option<&Path>,
    policy: ParsePolicy,
    month_filter: &[String],
) -> Result<CohortAnalysis> {
    let path = resolve_data_path(data_path);

    // ── Step 1: Load and normalize ────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let table = load_cohort_table(&path, policy)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Aggregate ─────────────────────────────────────────────────────
    let aggregate_start = std::time::Instant::now();
    let funnel = aggregate_funnel(&table, &columns::DEFAULT_FUNNEL, month_filter);
    let overview = compute_overview(&table);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    // ── Step 3: Build result ──────────────────────────────────────────────────
    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        source_path: path.display().to_string(),
        rows_processed: table.len(),
        columns_present: table.column_names().count(),
        load_time_seconds: load_time,
        aggregate_time_seconds: aggregate_time,
    };

    Ok(CohortAnalysis {
        months: table.months(),
        cohort_labels: table.cohort_labels(),
        funnel,
        overview,
        metadata,
        table,
    })
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Headline means over the whole table, rescaled for presentation.
fn compute_overview(table: &CohortTable) -> OverviewStats {
    OverviewStats {
        cohort_count: table.len(),
        mean_client_ltv: table.column_mean(columns::CLIENT_LTV),
        mean_tenure_months: table.column_mean(columns::AVG_TENURE),
        mean_conversion_pct: table
            .column_mean(columns::CONVERSION_PCT)
            .map(|f| f * 100.0),
        mean_new_clients: table.column_mean(columns::NEW_CLIENTS),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
