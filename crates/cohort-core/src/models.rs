use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Canonical column names of the cohort performance CSV.
///
/// The source file is expected (but not required) to carry these headers;
/// any of them may be absent and consumers degrade gracefully.
pub mod columns {
    pub const COHORTS: &str = "Cohorts";
    pub const STEP_1: &str = "Step 1";
    pub const STEP_2: &str = "Step 2";
    pub const STEP_3: &str = "Step 3";
    pub const STEP_4: &str = "Step 4";
    pub const NEW_CLIENTS: &str = "New Clients";
    pub const CLIENT_LTV: &str = "Client LTV";
    pub const AVG_TENURE: &str = "Avg. Tenure (Mo.)";
    pub const CONVERSION_PCT: &str = "Conversion %";
    pub const FUNNEL_ENTRIES: &str = "Conversion Funnel Entries";

    /// The default funnel rendered by the dashboard, in step order.
    pub const DEFAULT_FUNNEL: [&str; 5] = [STEP_1, STEP_2, STEP_3, STEP_4, CONVERSION_PCT];

    /// All numeric columns the normalizer knows how to coerce.
    pub const NUMERIC: [&str; 9] = [
        STEP_1,
        STEP_2,
        STEP_3,
        STEP_4,
        NEW_CLIENTS,
        CLIENT_LTV,
        AVG_TENURE,
        CONVERSION_PCT,
        FUNNEL_ENTRIES,
    ];
}

/// A single normalized row of the cohort performance table.
///
/// Numeric fields are `None` when their column is absent from the source
/// file; a *present* column always yields a value for every row (malformed
/// cells are repaired or rejected at load time depending on the parse
/// policy).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohortRecord {
    /// Raw cohort label, trimmed; `"Unknown Unknown"` when the cell was missing.
    pub cohort_label: String,
    /// First token of the label (always populated).
    pub month: String,
    /// Remainder of the label after the first space; empty when the label
    /// has no space.
    pub year: String,
    /// Funnel step percentages (percent of initial entries reaching the step).
    pub step_1: Option<f64>,
    pub step_2: Option<f64>,
    pub step_3: Option<f64>,
    pub step_4: Option<f64>,
    /// New-client percentage for the cohort.
    pub new_clients: Option<f64>,
    /// Client lifetime value in USD.
    pub client_ltv: Option<f64>,
    /// Average client tenure in months.
    pub avg_tenure_months: Option<f64>,
    /// Conversion rate stored as a fraction in `[0, 1]`; re-expressed as a
    /// percentage only at presentation time.
    pub conversion_pct: Option<f64>,
    /// Number of entrants at the top of the funnel (base population).
    pub funnel_entries: Option<f64>,
}

impl CohortRecord {
    /// Look up a numeric field by its canonical column name.
    ///
    /// Returns `None` for unknown names and for columns absent from the
    /// source table.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            columns::STEP_1 => self.step_1,
            columns::STEP_2 => self.step_2,
            columns::STEP_3 => self.step_3,
            columns::STEP_4 => self.step_4,
            columns::NEW_CLIENTS => self.new_clients,
            columns::CLIENT_LTV => self.client_ltv,
            columns::AVG_TENURE => self.avg_tenure_months,
            columns::CONVERSION_PCT => self.conversion_pct,
            columns::FUNNEL_ENTRIES => self.funnel_entries,
            _ => None,
        }
    }
}

/// The full normalized cohort table.
///
/// Row order and row count match the source file exactly; `columns` records
/// which numeric columns were actually present so consumers can distinguish
/// "absent column" from "all-zero column".
#[derive(Debug, Clone, Default)]
pub struct CohortTable {
    records: Vec<CohortRecord>,
    columns: BTreeSet<String>,
}

impl CohortTable {
    /// Build a table from normalized records and the set of numeric columns
    /// present in the source.
    pub fn new(records: Vec<CohortRecord>, columns: BTreeSet<String>) -> Self {
        Self { records, columns }
    }

    pub fn records(&self) -> &[CohortRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the given numeric column was present in the source file.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Numeric columns present in the source, in name order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Distinct month labels in first-seen order.
    pub fn months(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for record in &self.records {
            if seen.insert(record.month.clone()) {
                out.push(record.month.clone());
            }
        }
        out
    }

    /// Distinct cohort labels in first-seen order.
    pub fn cohort_labels(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for record in &self.records {
            if seen.insert(record.cohort_label.clone()) {
                out.push(record.cohort_label.clone());
            }
        }
        out
    }

    /// Arithmetic mean of a column across all rows.
    ///
    /// Returns `None` when the column is absent or the table is empty.
    pub fn column_mean(&self, name: &str) -> Option<f64> {
        if !self.has_column(name) || self.records.is_empty() {
            return None;
        }
        let sum: f64 = self
            .records
            .iter()
            .filter_map(|r| r.numeric(name))
            .sum();
        Some(sum / self.records.len() as f64)
    }
}

/// Split a raw cohort label into `(label, month, year)`.
///
/// The derivation is purely syntactic: the trimmed label is split on its
/// first space; `month` takes the first token and `year` the remainder
/// (empty when there is no space). A missing or blank cell defaults to
/// `"Unknown Unknown"`.
///
/// # Examples
///
/// ```
/// use cohort_core::models::split_cohort_label;
///
/// assert_eq!(
///     split_cohort_label(Some("May 2024")),
///     ("May 2024".to_string(), "May".to_string(), "2024".to_string())
/// );
/// assert_eq!(
///     split_cohort_label(Some("Spaceless")),
///     ("Spaceless".to_string(), "Spaceless".to_string(), String::new())
/// );
/// assert_eq!(
///     split_cohort_label(None),
///     ("Unknown Unknown".to_string(), "Unknown".to_string(), "Unknown".to_string())
/// );
/// ```
pub fn split_cohort_label(raw: Option<&str>) -> (String, String, String) {
    let trimmed = raw.map(str::trim).unwrap_or("");
    let label = if trimmed.is_empty() {
        "Unknown Unknown"
    } else {
        trimmed
    };

    match label.split_once(' ') {
        Some((month, year)) => (label.to_string(), month.to_string(), year.to_string()),
        None => (label.to_string(), label.to_string(), String::new()),
    }
}
