//! Conversion-funnel view for the Cohort Dash TUI.
//!
//! Renders one bar per funnel step showing the share of entrants reaching
//! it, the step-over-step delta, and the reconstructed head count.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use cohort_core::formatting;
use cohort_runtime::data::aggregator::{FunnelStep, FunnelSummary};

use crate::components::funnel_bar::FunnelBar;
use crate::themes::Theme;

/// Render the funnel view into `area`.
pub fn render_funnel_view(frame: &mut Frame, area: Rect, summary: &FunnelSummary, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(" Conversion Funnel ");

    if summary.steps.is_empty() {
        let message = if summary.month_filter.is_empty() {
            "No funnel data available".to_string()
        } else {
            format!(
                "No cohorts match month filter \"{}\"",
                summary.month_filter.join(", ")
            )
        };
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(message, theme.warning)),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let mut lines: Vec<Line> = Vec::with_capacity(summary.steps.len() * 3 + 2);
    lines.push(summary_line(summary, theme));
    lines.push(Line::from(""));

    for (i, step) in summary.steps.iter().enumerate() {
        lines.push(step_label_line(i, step, theme));
        lines.push(FunnelBar::new(step.display_value, step.absolute_count, theme).to_line());
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).block(block).style(theme.text), area);
}

// ── Line builders ─────────────────────────────────────────────────────────────

/// `"Cohorts: 12 | Entries (mean): 40,500"` or just the cohort count.
fn summary_line<'a>(summary: &FunnelSummary, theme: &'a Theme) -> Line<'a> {
    let mut spans = vec![
        Span::styled("Cohorts: ", theme.label),
        Span::styled(summary.cohort_count.to_string(), theme.value),
    ];
    if let Some(entries) = summary.mean_entries {
        spans.push(Span::styled(" | Entries (mean): ", theme.label));
        spans.push(Span::styled(
            formatting::format_number(entries, 0),
            theme.value,
        ));
    }
    Line::from(spans)
}

/// `"Step 2               Δ -38%"`; the first step shows no delta.
fn step_label_line<'a>(index: usize, step: &FunnelStep, theme: &'a Theme) -> Line<'a> {
    let mut spans = vec![Span::styled(format!("{:<20}", step.column), theme.bold)];
    if index == 0 {
        spans.push(Span::styled("start", theme.dim));
    } else {
        spans.push(Span::styled(
            format!("Δ {}", formatting::format_percent(step.delta * 100.0, 0)),
            theme.delta_style(step.delta),
        ));
    }
    Line::from(spans)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
