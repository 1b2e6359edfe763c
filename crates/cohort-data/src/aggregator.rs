//! Funnel aggregation and cohort comparison.
//!
//! Consumes a normalized [`CohortTable`] and produces the per-step summary
//! statistics the views render: column means, step-over-step deltas, and
//! reconstructed absolute counts.

use cohort_core::formatting::round_to;
use cohort_core::models::{columns, CohortRecord, CohortTable};

// ── Public types ──────────────────────────────────────────────────────────────

/// One aggregated step of the funnel.
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelStep {
    /// Column this step was computed from.
    pub column: String,
    /// Arithmetic mean of the normalized column over the selected cohorts.
    pub mean: f64,
    /// Presentation value in percentage points. Identical to `mean` for the
    /// step columns; the conversion-rate fraction is rescaled by 100.
    pub display_value: f64,
    /// Relative change versus the previous step, rounded to two decimals.
    /// The first step carries the sentinel `1.0`, as does any step whose
    /// predecessor has a zero mean.
    pub delta: f64,
    /// Estimated number of people reaching this step, reconstructed from the
    /// mean funnel-entry count. `None` when the entries column is absent.
    pub absolute_count: Option<i64>,
}

/// Aggregated funnel over a (possibly month-filtered) set of cohorts.
#[derive(Debug, Clone, Default)]
pub struct FunnelSummary {
    pub steps: Vec<FunnelStep>,
    /// The month labels the summary was restricted to. Empty means all rows.
    pub month_filter: Vec<String>,
    /// Number of cohort rows that contributed to the means.
    pub cohort_count: usize,
    /// Mean funnel-entry count over the selected cohorts.
    pub mean_entries: Option<f64>,
}

/// One metric compared across two cohorts.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub column: String,
    /// Mean for the left cohort, in presentation units.
    pub left: Option<f64>,
    /// Mean for the right cohort, in presentation units.
    pub right: Option<f64>,
    /// `right - left` when both sides are available.
    pub diff: Option<f64>,
}

/// Side-by-side metric comparison of two cohorts.
#[derive(Debug, Clone, Default)]
pub struct CohortComparison {
    pub left_label: String,
    pub right_label: String,
    pub rows: Vec<ComparisonRow>,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Aggregate the funnel columns of `table` into per-step summaries.
///
/// * `step_columns` – funnel columns in step order; columns absent from the
///   table are silently skipped.
/// * `month_filter` – a set of month labels; only cohorts whose month label
///   is in the set contribute. An empty set keeps every row; a set matching
///   no cohort yields an empty summary.
pub fn aggregate_funnel(
    table: &CohortTable,
    step_columns: &[&str],
    month_filter: &[String],
) -> FunnelSummary {
    let rows: Vec<&CohortRecord> = table
        .records()
        .iter()
        .filter(|r| month_filter.is_empty() || month_filter.iter().any(|m| *m == r.month))
        .collect();

    let mut summary = FunnelSummary {
        month_filter: month_filter.to_vec(),
        cohort_count: rows.len(),
        ..Default::default()
    };
    if rows.is_empty() {
        return summary;
    }

    summary.mean_entries = if table.has_column(columns::FUNNEL_ENTRIES) {
        Some(mean_of(&rows, columns::FUNNEL_ENTRIES))
    } else {
        None
    };

    let mut previous_display: Option<f64> = None;
    for &column in step_columns {
        if !table.has_column(column) {
            continue;
        }

        let mean = mean_of(&rows, column);
        let display_value = to_display(column, mean);

        // Relative change over the previous kept step; the sentinel 1.0
        // stands in for "no predecessor" and for a zero denominator.
        let delta = match previous_display {
            Some(prev) if prev != 0.0 => round_to((display_value - prev) / prev, 2),
            _ => 1.0,
        };
        previous_display = Some(display_value);

        let absolute_count = summary
            .mean_entries
            .map(|entries| (entries * display_value / 100.0).round() as i64);

        summary.steps.push(FunnelStep {
            column: column.to_string(),
            mean,
            display_value,
            delta,
            absolute_count,
        });
    }

    summary
}

/// Compare per-column means of two cohorts, in presentation units.
///
/// Columns absent from the table yield `None` on both sides; a cohort label
/// matching no row yields `None` for that side.
pub fn compare_cohorts(
    table: &CohortTable,
    left_label: &str,
    right_label: &str,
    compare_columns: &[&str],
) -> CohortComparison {
    let mut comparison = CohortComparison {
        left_label: left_label.to_string(),
        right_label: right_label.to_string(),
        rows: Vec::new(),
    };

    for &column in compare_columns {
        let left = cohort_mean(table, left_label, column);
        let right = cohort_mean(table, right_label, column);
        let diff = match (left, right) {
            (Some(l), Some(r)) => Some(r - l),
            _ => None,
        };
        comparison.rows.push(ComparisonRow {
            column: column.to_string(),
            left,
            right,
            diff,
        });
    }

    comparison
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn mean_of(rows: &[&CohortRecord], column: &str) -> f64 {
    let sum: f64 = rows.iter().filter_map(|r| r.numeric(column)).sum();
    sum / rows.len() as f64
}

/// Rescale a normalized mean into percentage points for presentation.
fn to_display(column: &str, mean: f64) -> f64 {
    if column == columns::CONVERSION_PCT {
        mean * 100.0
    } else {
        mean
    }
}

fn cohort_mean(table: &CohortTable, label: &str, column: &str) -> Option<f64> {
    if !table.has_column(column) {
        return None;
    }
    let rows: Vec<&CohortRecord> = table
        .records()
        .iter()
        .filter(|r| r.cohort_label == label)
        .collect();
    if rows.is_empty() {
        return None;
    }
    Some(to_display(column, mean_of(&rows, column)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
