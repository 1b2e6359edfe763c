use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Dashboard header rendering four lines:
///
/// 1. Application title (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. View, data source, and month filter in `[ view | source | month ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Active view name (e.g. "overview", "funnel").
    pub view: &'a str,
    /// Data source being displayed, typically the CSV file name.
    pub source: &'a str,
    /// Month restriction, shown as "all months" when absent.
    pub month_filter: Option<&'a str>,
    /// Theme providing colour styles for each part of the header.
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    /// Construct a new header.
    pub fn new(
        view: &'a str,
        source: &'a str,
        month_filter: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            view,
            source,
            month_filter,
            theme,
        }
    }

    /// Render the header as a `Vec<Line>` containing exactly four lines.
    ///
    /// The returned lines are:
    ///
    /// 1. `"COHORT PERFORMANCE DASHBOARD"`
    /// 2. `"============================================================"` (60 `=` chars)
    /// 3. `"[ funnel | cohorts.csv | May ]"`
    /// 4. `""`
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        vec![
            // Title line.
            Line::from(Span::styled(
                "COHORT PERFORMANCE DASHBOARD",
                self.theme.header,
            )),
            // Separator line.
            Line::from(Span::styled(separator, self.theme.separator)),
            // View / source / month info line.
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.view.to_lowercase(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.source.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(
                    self.month_filter.unwrap_or("all months").to_string(),
                    self.theme.value,
                ),
                Span::styled(" ]", self.theme.label),
            ]),
            // Empty line.
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
