//! CSV loading and normalization for Cohort Dash.
//!
//! Reads the cohort performance CSV from disk and converts it into a
//! [`CohortTable`] of typed records for downstream aggregation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use cohort_core::coerce::{ParsePolicy, ValueCoercer, ValueKind};
use cohort_core::error::{DashError, Result};
use cohort_core::models::{columns, split_cohort_label, CohortRecord, CohortTable};
use tracing::debug;

/// Default location of the cohort CSV relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data/cohort_performance_2024.csv";

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve the data path: use `data_path` when given, otherwise fall back to
/// [`DEFAULT_DATA_FILE`] in the current working directory.
pub fn resolve_data_path(data_path: Option<&Path>) -> PathBuf {
    match data_path {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(DEFAULT_DATA_FILE),
    }
}

/// Load and normalize the cohort performance CSV at `path`.
///
/// Row order and row count are preserved exactly. Numeric columns listed in
/// [`columns::NUMERIC`] are coerced to floats according to their formatting
/// convention; columns absent from the header are skipped and recorded as
/// absent on the returned table. Unknown extra columns are ignored.
///
/// Under [`ParsePolicy::Lenient`] the load only fails on I/O or structural
/// CSV errors; under [`ParsePolicy::Strict`] it additionally fails on the
/// first non-blank cell that cannot be coerced.
pub fn load_cohort_table(path: &Path, policy: ParsePolicy) -> Result<CohortTable> {
    if !path.exists() {
        return Err(DashError::DataPathNotFound(path.to_path_buf()));
    }

    let file = std::fs::File::open(path).map_err(|source| DashError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    // flexible: short rows are padded with blank cells rather than rejected.
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let headers = csv_reader.headers()?.clone();
    let cohort_idx = headers.iter().position(|h| h.trim() == columns::COHORTS);

    let mut numeric_layout: Vec<(usize, &'static str, ValueKind)> = Vec::new();
    for name in columns::NUMERIC {
        if let Some(idx) = headers.iter().position(|h| h.trim() == name) {
            if let Some(kind) = ValueKind::for_column(name) {
                numeric_layout.push((idx, name, kind));
            }
        }
    }
    let present: BTreeSet<String> = numeric_layout
        .iter()
        .map(|&(_, name, _)| name.to_string())
        .collect();

    let coercer = ValueCoercer::new(policy);
    let mut records: Vec<CohortRecord> = Vec::new();

    for row in csv_reader.records() {
        let row = row?;

        let raw_label = cohort_idx.and_then(|idx| row.get(idx));
        let (cohort_label, month, year) = split_cohort_label(raw_label);

        let mut record = CohortRecord {
            cohort_label,
            month,
            year,
            ..Default::default()
        };
        for &(idx, name, kind) in &numeric_layout {
            let raw = row.get(idx).unwrap_or("");
            let value = coercer.coerce(kind, name, raw)?;
            set_numeric(&mut record, name, value);
        }
        records.push(record);
    }

    debug!(
        rows = records.len(),
        columns = present.len(),
        "loaded cohort table from {}",
        path.display()
    );

    Ok(CohortTable::new(records, present))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn set_numeric(record: &mut CohortRecord, column: &str, value: f64) {
    let slot = match column {
        columns::STEP_1 => &mut record.step_1,
        columns::STEP_2 => &mut record.step_2,
        columns::STEP_3 => &mut record.step_3,
        columns::STEP_4 => &mut record.step_4,
        columns::NEW_CLIENTS => &mut record.new_clients,
        columns::CLIENT_LTV => &mut record.client_ltv,
        columns::AVG_TENURE => &mut record.avg_tenure_months,
        columns::CONVERSION_PCT => &mut record.conversion_pct,
        columns::FUNNEL_ENTRIES => &mut record.funnel_entries,
        _ => return,
    };
    *slot = Some(value);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    const FULL_CSV: &str = "\
Cohorts,Step 1,Step 2,Step 3,Step 4,New Clients,Client LTV,Avg. Tenure (Mo.),Conversion %,Conversion Funnel Entries
May 2024,100%,62%,20%,5%,2%,\"$1,420.00\",3.2,2.20%,\"40,500\"
June 2024,100%,58%,18%,4%,2%,\"$1,310.50\",2.9,1.90%,\"38,200\"
";

    // ── resolve_data_path ─────────────────────────────────────────────────────

    #[test]
    fn test_resolve_data_path_explicit() {
        let p = resolve_data_path(Some(Path::new("/data/x.csv")));
        assert_eq!(p, PathBuf::from("/data/x.csv"));
    }

    #[test]
    fn test_resolve_data_path_default() {
        let p = resolve_data_path(None);
        assert_eq!(p, PathBuf::from(DEFAULT_DATA_FILE));
    }

    // ── load_cohort_table ─────────────────────────────────────────────────────

    #[test]
    fn test_load_full_table() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "cohorts.csv", FULL_CSV);

        let table = load_cohort_table(&path, ParsePolicy::Lenient).unwrap();

        assert_eq!(table.len(), 2);
        for name in columns::NUMERIC {
            assert!(table.has_column(name), "column {name:?} should be present");
        }

        let first = &table.records()[0];
        assert_eq!(first.cohort_label, "May 2024");
        assert_eq!(first.month, "May");
        assert_eq!(first.year, "2024");
        assert_eq!(first.step_1, Some(100.0));
        assert_eq!(first.step_2, Some(62.0));
        assert_eq!(first.client_ltv, Some(1420.0));
        assert_eq!(first.avg_tenure_months, Some(3.2));
        assert!((first.conversion_pct.unwrap() - 0.022).abs() < 1e-12);
        assert_eq!(first.funnel_entries, Some(40_500.0));
    }

    #[test]
    fn test_load_preserves_row_order() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "cohorts.csv", FULL_CSV);

        let table = load_cohort_table(&path, ParsePolicy::Lenient).unwrap();
        let labels: Vec<&str> = table
            .records()
            .iter()
            .map(|r| r.cohort_label.as_str())
            .collect();
        assert_eq!(labels, vec!["May 2024", "June 2024"]);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = load_cohort_table(
            Path::new("/tmp/does-not-exist-cohort-test-xyz.csv"),
            ParsePolicy::Lenient,
        )
        .unwrap_err();
        assert!(matches!(err, DashError::DataPathNotFound(_)));
    }

    #[test]
    fn test_load_missing_columns_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "cohorts.csv",
            "Cohorts,Step 1,Client LTV\nMay 2024,100%,\"$1,000.00\"\n",
        );

        let table = load_cohort_table(&path, ParsePolicy::Lenient).unwrap();
        assert!(table.has_column(columns::STEP_1));
        assert!(table.has_column(columns::CLIENT_LTV));
        assert!(!table.has_column(columns::STEP_2));
        assert_eq!(table.records()[0].step_2, None);
    }

    #[test]
    fn test_load_missing_cohort_label_defaults_to_unknown() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "cohorts.csv",
            "Cohorts,Step 1\n,100%\nJuly 2024,90%\n",
        );

        let table = load_cohort_table(&path, ParsePolicy::Lenient).unwrap();
        assert_eq!(table.records()[0].cohort_label, "Unknown Unknown");
        assert_eq!(table.records()[0].month, "Unknown");
        assert_eq!(table.records()[0].year, "Unknown");
        assert_eq!(table.records()[1].month, "July");
    }

    #[test]
    fn test_load_blank_cells_become_zero() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "cohorts.csv",
            "Cohorts,Step 1,Step 2\nMay 2024,100%,\n",
        );

        let table = load_cohort_table(&path, ParsePolicy::Lenient).unwrap();
        assert_eq!(table.records()[0].step_2, Some(0.0));
    }

    #[test]
    fn test_load_lenient_repairs_garbage_to_zero() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "cohorts.csv",
            "Cohorts,Step 1\nMay 2024,garbage\n",
        );

        let table = load_cohort_table(&path, ParsePolicy::Lenient).unwrap();
        assert_eq!(table.records()[0].step_1, Some(0.0));
    }

    #[test]
    fn test_load_strict_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "cohorts.csv",
            "Cohorts,Step 1\nMay 2024,garbage\n",
        );

        let err = load_cohort_table(&path, ParsePolicy::Strict).unwrap_err();
        match err {
            DashError::CellParse { column, value } => {
                assert_eq!(column, columns::STEP_1);
                assert_eq!(value, "garbage");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_short_row_padded_with_blanks() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "cohorts.csv",
            "Cohorts,Step 1,Step 2\nMay 2024,100%\n",
        );

        let table = load_cohort_table(&path, ParsePolicy::Lenient).unwrap();
        assert_eq!(table.records()[0].step_1, Some(100.0));
        assert_eq!(table.records()[0].step_2, Some(0.0));
    }

    #[test]
    fn test_load_header_whitespace_tolerated() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "cohorts.csv",
            " Cohorts , Step 1 \nMay 2024,100%\n",
        );

        let table = load_cohort_table(&path, ParsePolicy::Lenient).unwrap();
        assert!(table.has_column(columns::STEP_1));
        assert_eq!(table.records()[0].month, "May");
    }

    #[test]
    fn test_load_empty_table_no_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "cohorts.csv", "Cohorts,Step 1\n");

        let table = load_cohort_table(&path, ParsePolicy::Lenient).unwrap();
        assert!(table.is_empty());
        assert!(table.has_column(columns::STEP_1));
    }
}
