//! Cohort overview table for the Cohort Dash TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per cohort
//! plus a highlighted means row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use cohort_core::formatting;
use cohort_core::models::{columns, CohortTable};
use cohort_runtime::data::analysis::OverviewStats;

use crate::themes::Theme;

/// Data for a single cohort row in the overview table.
#[derive(Debug, Clone, Default)]
pub struct CohortRowData {
    pub cohort: String,
    pub step_1: Option<f64>,
    pub step_2: Option<f64>,
    pub step_3: Option<f64>,
    pub step_4: Option<f64>,
    pub new_clients: Option<f64>,
    pub client_ltv: Option<f64>,
    pub avg_tenure_months: Option<f64>,
    /// Conversion rate as a fraction; rendered in percentage points.
    pub conversion_pct: Option<f64>,
}

/// Build overview rows from a normalized table, preserving file order.
pub fn cohort_rows(table: &CohortTable) -> Vec<CohortRowData> {
    table
        .records()
        .iter()
        .map(|r| CohortRowData {
            cohort: r.cohort_label.clone(),
            step_1: r.step_1,
            step_2: r.step_2,
            step_3: r.step_3,
            step_4: r.step_4,
            new_clients: r.new_clients,
            client_ltv: r.client_ltv,
            avg_tenure_months: r.avg_tenure_months,
            conversion_pct: r.conversion_pct,
        })
        .collect()
}

/// Render the cohort overview table into `area`.
///
/// The table has one data row per [`CohortRowData`] entry, followed by a
/// highlighted means row computed over the full table, all within a bordered
/// block titled `title`.
pub fn render_overview_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[CohortRowData],
    overview: &OverviewStats,
    theme: &Theme,
) {
    let header_cells = [
        columns::COHORTS,
        columns::STEP_1,
        columns::STEP_2,
        columns::STEP_3,
        columns::STEP_4,
        columns::NEW_CLIENTS,
        columns::CLIENT_LTV,
        "Tenure",
        columns::CONVERSION_PCT,
    ]
    .iter()
    .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(row.cohort.clone()),
                Cell::from(fmt_step(row.step_1)),
                Cell::from(fmt_step(row.step_2)),
                Cell::from(fmt_step(row.step_3)),
                Cell::from(fmt_step(row.step_4)),
                Cell::from(fmt_step(row.new_clients)),
                Cell::from(fmt_currency(row.client_ltv)),
                Cell::from(fmt_months(row.avg_tenure_months)),
                Cell::from(fmt_conversion(row.conversion_pct)),
            ])
            .style(style)
        })
        .collect();

    // Means row – styled separately to stand out.
    let mean_row = Row::new(vec![
        Cell::from("MEAN").style(theme.table_total),
        Cell::from(""),
        Cell::from(""),
        Cell::from(""),
        Cell::from(""),
        Cell::from(fmt_step(overview.mean_new_clients)),
        Cell::from(fmt_currency(overview.mean_client_ltv)),
        Cell::from(fmt_months(overview.mean_tenure_months)),
        Cell::from(
            overview
                .mean_conversion_pct
                .map(|v| formatting::format_percent(v, 2))
                .unwrap_or_else(placeholder),
        ),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(mean_row);

    let widths = [
        Constraint::Length(16),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(13),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder when the table has no cohorts.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No cohort data found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Point --data at a cohort performance CSV.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Cohort Dash "),
        ),
        area,
    );
}

// ── Cell formatting ───────────────────────────────────────────────────────────

fn placeholder() -> String {
    "-".to_string()
}

fn fmt_step(value: Option<f64>) -> String {
    value
        .map(|v| formatting::format_percent(v, 0))
        .unwrap_or_else(placeholder)
}

fn fmt_currency(value: Option<f64>) -> String {
    value
        .map(formatting::format_currency)
        .unwrap_or_else(placeholder)
}

fn fmt_months(value: Option<f64>) -> String {
    value
        .map(|v| formatting::format_number(v, 1))
        .unwrap_or_else(placeholder)
}

fn fmt_conversion(value: Option<f64>) -> String {
    value
        .map(|v| formatting::format_percent(v * 100.0, 2))
        .unwrap_or_else(placeholder)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::Theme;
    use cohort_core::models::{split_cohort_label, CohortRecord};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::collections::BTreeSet;

    fn make_table() -> CohortTable {
        let make = |label: &str, ltv: f64, conv: f64| {
            let (cohort_label, month, year) = split_cohort_label(Some(label));
            CohortRecord {
                cohort_label,
                month,
                year,
                step_1: Some(100.0),
                step_2: Some(62.0),
                step_3: Some(20.0),
                step_4: Some(5.0),
                new_clients: Some(2.0),
                client_ltv: Some(ltv),
                avg_tenure_months: Some(3.2),
                conversion_pct: Some(conv),
                funnel_entries: Some(40_500.0),
            }
        };
        let present: BTreeSet<String> =
            columns::NUMERIC.iter().map(|c| c.to_string()).collect();
        CohortTable::new(
            vec![make("May 2024", 1420.0, 0.022), make("June 2024", 1310.0, 0.019)],
            present,
        )
    }

    fn make_overview() -> OverviewStats {
        OverviewStats {
            cohort_count: 2,
            mean_client_ltv: Some(1365.0),
            mean_tenure_months: Some(3.2),
            mean_conversion_pct: Some(2.05),
            mean_new_clients: Some(2.0),
        }
    }

    // ── Row construction ──────────────────────────────────────────────────────

    #[test]
    fn test_cohort_rows_from_table() {
        let rows = cohort_rows(&make_table());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cohort, "May 2024");
        assert_eq!(rows[0].step_2, Some(62.0));
        assert_eq!(rows[1].client_ltv, Some(1310.0));
    }

    // ── Cell formatting ───────────────────────────────────────────────────────

    #[test]
    fn test_fmt_step_percent() {
        assert_eq!(fmt_step(Some(62.0)), "62%");
        assert_eq!(fmt_step(None), "-");
    }

    #[test]
    fn test_fmt_currency() {
        assert_eq!(fmt_currency(Some(1420.0)), "$1,420.00");
        assert_eq!(fmt_currency(None), "-");
    }

    #[test]
    fn test_fmt_conversion_rescales_fraction() {
        assert_eq!(fmt_conversion(Some(0.022)), "2.20%");
        assert_eq!(fmt_conversion(None), "-");
    }

    // ── Render (does not panic) ───────────────────────────────────────────────

    #[test]
    fn test_render_overview_table_does_not_panic() {
        let backend = TestBackend::new(130, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let rows = cohort_rows(&make_table());
        let overview = make_overview();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_overview_table(frame, area, "Cohort Overview", &rows, &overview, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_overview_table_empty_rows_does_not_panic() {
        let backend = TestBackend::new(130, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let rows: Vec<CohortRowData> = vec![];
        let overview = OverviewStats::default();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_overview_table(frame, area, "Cohort Overview", &rows, &overview, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_overview_table_missing_columns_does_not_panic() {
        let backend = TestBackend::new(130, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();
        let rows = vec![CohortRowData {
            cohort: "May 2024".to_string(),
            step_1: Some(100.0),
            ..Default::default()
        }];
        let overview = OverviewStats::default();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_overview_table(frame, area, "Cohort Overview", &rows, &overview, &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_no_data(frame, area, &theme);
            })
            .unwrap();
    }
}
