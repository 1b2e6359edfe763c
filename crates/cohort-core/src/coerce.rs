use tracing::warn;

use crate::error::{DashError, Result};
use crate::models::columns;

/// How malformed numeric cells are handled during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Repair: any cell that cannot be coerced becomes `0.0` (with a
    /// warning). Blank cells are always `0.0`. Loading never fails on cell
    /// content.
    #[default]
    Lenient,
    /// Reject: a non-blank cell that cannot be coerced fails the load with
    /// [`DashError::CellParse`]. Blank cells are still treated as missing
    /// and coerce to `0.0`.
    Strict,
}

/// The formatting convention a numeric column uses in the source CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Percent-of-cohort counts: `%`, thousands separators, and spaces are
    /// decoration ("12%", "1,234", "").
    Count,
    /// Dollar amounts: `$`, thousands separators, and spaces are decoration
    /// ("$1,420.00").
    Currency,
    /// Plain decimals with optional thousands separators (" 3.2 ").
    Plain,
    /// Percentages rescaled to fractions: "2.20%" becomes `0.022`.
    Fraction,
}

impl ValueKind {
    /// The convention used by a canonical column, if it is numeric.
    pub fn for_column(column: &str) -> Option<ValueKind> {
        match column {
            columns::STEP_1
            | columns::STEP_2
            | columns::STEP_3
            | columns::STEP_4
            | columns::NEW_CLIENTS => Some(ValueKind::Count),
            columns::CLIENT_LTV => Some(ValueKind::Currency),
            columns::AVG_TENURE | columns::FUNNEL_ENTRIES => Some(ValueKind::Plain),
            columns::CONVERSION_PCT => Some(ValueKind::Fraction),
            _ => None,
        }
    }
}

/// Coerces raw CSV text to floats.
///
/// Stateless apart from the parse policy; one coercer normalizes an entire
/// table. In lenient mode every method is total: any input string yields a
/// float.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCoercer {
    policy: ParsePolicy,
}

impl ValueCoercer {
    pub fn new(policy: ParsePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ParsePolicy {
        self.policy
    }

    /// Coerce one cell according to its column's formatting convention.
    pub fn coerce(&self, kind: ValueKind, column: &str, raw: &str) -> Result<f64> {
        let cleaned = match kind {
            ValueKind::Count => clean(raw, &['%', ',', ' ']),
            ValueKind::Currency => clean(raw, &['$', ',', ' ']),
            ValueKind::Plain => clean(raw, &[',', ' ']),
            ValueKind::Fraction => clean(raw, &['%', ',', ' ']),
        };

        // Blank means missing, never malformed.
        if cleaned.is_empty() {
            return Ok(0.0);
        }

        let parsed = match cleaned.parse::<f64>() {
            Ok(value) => value,
            Err(_) => match self.policy {
                ParsePolicy::Lenient => {
                    warn!(column, value = raw, "unparseable cell coerced to 0");
                    0.0
                }
                ParsePolicy::Strict => {
                    return Err(DashError::CellParse {
                        column: column.to_string(),
                        value: raw.to_string(),
                    });
                }
            },
        };

        Ok(match kind {
            ValueKind::Fraction => parsed / 100.0,
            _ => parsed,
        })
    }
}

fn clean(raw: &str, decoration: &[char]) -> String {
    raw.chars().filter(|c| !decoration.contains(c)).collect()
}
