//! Side-by-side cohort comparison view for the Cohort Dash TUI.

use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use cohort_core::formatting;
use cohort_core::models::columns;
use cohort_runtime::data::aggregator::CohortComparison;

use crate::themes::Theme;

/// Render the comparison table into `area`.
///
/// One row per compared metric, with the two cohorts side by side and the
/// difference (`right - left`) in the last column.
pub fn render_compare_view(
    frame: &mut Frame,
    area: Rect,
    comparison: &CohortComparison,
    theme: &Theme,
) {
    let header_cells = [
        "Metric",
        comparison.left_label.as_str(),
        comparison.right_label.as_str(),
        "Δ",
    ]
    .into_iter()
    .map(|h| Cell::from(h.to_string()).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = comparison
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let diff_cell = match row.diff {
                Some(diff) => {
                    Cell::from(fmt_metric(&row.column, diff)).style(theme.delta_style(diff))
                }
                None => Cell::from("-"),
            };
            Row::new(vec![
                Cell::from(row.column.clone()),
                Cell::from(fmt_opt(&row.column, row.left)),
                Cell::from(fmt_opt(&row.column, row.right)),
                diff_cell,
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(22),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(12),
    ];

    let table = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Cohort Comparison "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

// ── Cell formatting ───────────────────────────────────────────────────────────

/// Format a value in the units its column is read in.
///
/// Comparison values arrive already in presentation units (conversion rates
/// in percentage points), so only the rendering convention varies.
fn fmt_metric(column: &str, value: f64) -> String {
    match column {
        columns::CLIENT_LTV => formatting::format_currency(value),
        columns::AVG_TENURE => formatting::format_number(value, 1),
        columns::FUNNEL_ENTRIES => formatting::format_number(value, 0),
        columns::CONVERSION_PCT => formatting::format_percent(value, 2),
        _ => formatting::format_percent(value, 0),
    }
}

fn fmt_opt(column: &str, value: Option<f64>) -> String {
    value
        .map(|v| fmt_metric(column, v))
        .unwrap_or_else(|| "-".to_string())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
