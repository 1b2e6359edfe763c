use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Configuration controlling visual appearance of a funnel bar.
pub struct FunnelBarConfig {
    /// Total width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    /// Character used to fill the retained portion of the bar.
    pub filled_char: char,
    /// Character used to fill the empty portion of the bar.
    pub empty_char: char,
    /// Whether to append a percentage figure after the bar.
    pub show_percentage: bool,
    /// Whether to append the reconstructed head count after the bar.
    pub show_count: bool,
}

impl Default for FunnelBarConfig {
    fn default() -> Self {
        Self {
            width: 50,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
            show_percentage: true,
            show_count: true,
        }
    }
}

// ── FunnelBar ────────────────────────────────────────────────────────────────

/// Horizontal bar showing the share of funnel entrants reaching a step.
///
/// Renders as a coloured fill + empty portion followed by a label that shows
/// the retention percentage and, when known, the reconstructed absolute head
/// count formatted with thousands separators.
pub struct FunnelBar<'a> {
    /// Percentage of entrants reaching this step, clamped to `[0.0, 100.0]`
    /// for the fill width (the label shows the raw value).
    pub percentage: f64,
    /// Reconstructed absolute count, when the entries column is available.
    pub count: Option<i64>,
    /// Theme from which colour styles are taken.
    pub theme: &'a Theme,
    /// Visual configuration.
    pub config: FunnelBarConfig,
}

impl<'a> FunnelBar<'a> {
    /// Construct a new bar.
    pub fn new(percentage: f64, count: Option<i64>, theme: &'a Theme) -> Self {
        Self {
            percentage,
            count,
            theme,
            config: FunnelBarConfig::default(),
        }
    }

    /// Render the bar as a [`Line`] suitable for embedding in any ratatui
    /// widget that accepts `Line` values.
    pub fn to_line(&self) -> Line<'a> {
        let clamped = self.percentage.clamp(0.0, 100.0);
        let filled = ((clamped / 100.0) * self.config.width as f64) as u16;
        let empty = self.config.width.saturating_sub(filled);

        let bar_style = self.theme.bar_style(clamped);

        let filled_str: String = self.config.filled_char.to_string().repeat(filled as usize);
        let empty_str: String = self.config.empty_char.to_string().repeat(empty as usize);

        let mut label = String::new();
        if self.config.show_percentage {
            label.push_str(&format!(" {:.1}%", self.percentage));
        }
        if self.config.show_count {
            if let Some(count) = self.count {
                label.push_str(&format!(
                    " ({})",
                    cohort_core::formatting::format_number(count as f64, 0)
                ));
            }
        }

        Line::from(vec![
            Span::styled(filled_str, bar_style),
            Span::styled(empty_str, self.theme.bar_empty),
            Span::styled(label, self.theme.bar_label),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::Theme;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_full_bar_filled_width() {
        let theme = Theme::dark();
        let bar = FunnelBar::new(100.0, Some(40_500), &theme);
        let line = bar.to_line();

        let text = line_text(&line);
        assert_eq!(text.matches('\u{2588}').count(), 50);
        assert_eq!(text.matches('\u{2591}').count(), 0);
        assert!(text.contains("100.0%"));
        assert!(text.contains("(40,500)"));
    }

    #[test]
    fn test_half_bar_split() {
        let theme = Theme::dark();
        let bar = FunnelBar::new(50.0, None, &theme);
        let text = line_text(&bar.to_line());

        assert_eq!(text.matches('\u{2588}').count(), 25);
        assert_eq!(text.matches('\u{2591}').count(), 25);
        // No count label without a reconstructed count.
        assert!(!text.contains('('));
    }

    #[test]
    fn test_zero_bar_all_empty() {
        let theme = Theme::dark();
        let bar = FunnelBar::new(0.0, Some(0), &theme);
        let text = line_text(&bar.to_line());

        assert_eq!(text.matches('\u{2588}').count(), 0);
        assert_eq!(text.matches('\u{2591}').count(), 50);
    }

    #[test]
    fn test_over_100_percent_clamps_fill_not_label() {
        let theme = Theme::dark();
        let bar = FunnelBar::new(120.0, None, &theme);
        let text = line_text(&bar.to_line());

        assert_eq!(text.matches('\u{2588}').count(), 50);
        assert!(text.contains("120.0%"), "label shows the raw value");
    }

    #[test]
    fn test_custom_width() {
        let theme = Theme::dark();
        let mut bar = FunnelBar::new(100.0, None, &theme);
        bar.config.width = 10;
        let text = line_text(&bar.to_line());

        assert_eq!(text.matches('\u{2588}').count(), 10);
    }
}
