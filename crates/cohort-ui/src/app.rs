//! Main application state and TUI event loop for Cohort Dash.
//!
//! [`App`] owns the theme, view mode, month filter, and the last received
//! dashboard snapshot.  It drives the interactive event loop and dispatches
//! rendering to the overview, funnel, and comparison views.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;

use cohort_core::models::columns;
use cohort_runtime::data::aggregator::{aggregate_funnel, compare_cohorts, FunnelSummary};
use cohort_runtime::orchestrator::DashboardData;

use crate::compare_view;
use crate::components::header::Header;
use crate::funnel_view;
use crate::table_view;
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// Full per-cohort metrics table with a means row.
    Overview,
    /// Step-by-step conversion funnel with bars and deltas.
    Funnel,
    /// Side-by-side comparison of two cohorts.
    Compare,
}

impl ViewMode {
    /// Resolve a view name from the CLI (`overview`, `funnel`, `compare`).
    ///
    /// Unknown names fall back to [`ViewMode::Overview`].
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "funnel" => ViewMode::Funnel,
            "compare" => ViewMode::Compare,
            _ => ViewMode::Overview,
        }
    }

    /// Short label shown in the header.
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Overview => "Overview",
            ViewMode::Funnel => "Funnel",
            ViewMode::Compare => "Compare",
        }
    }

    /// The view reached by pressing `Tab`.
    fn next(&self) -> Self {
        match self {
            ViewMode::Overview => ViewMode::Funnel,
            ViewMode::Funnel => ViewMode::Compare,
            ViewMode::Compare => ViewMode::Overview,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the Cohort Dash TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Current view mode.
    pub view_mode: ViewMode,
    /// Display string for the data source, shown in the header.
    pub source: String,
    /// Month labels restricting the funnel. Empty means all months.
    pub month_filter: Vec<String>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Most recent dashboard snapshot, `None` until the first data arrives.
    pub last_data: Option<DashboardData>,
    /// Funnel summary recomputed locally whenever the snapshot or the month
    /// filter changes, so the filter can be cycled without a reload.
    funnel: FunnelSummary,
    /// Index of the left-hand cohort in the comparison view.
    compare_left: usize,
    /// Index of the right-hand cohort in the comparison view.
    compare_right: usize,
    /// Wall-clock time of the last received snapshot.
    last_refresh: Option<chrono::DateTime<chrono::Local>>,
}

impl App {
    /// Construct a new application with the given configuration.
    pub fn new(
        theme_name: &str,
        view_mode: ViewMode,
        source: String,
        month_filter: Vec<String>,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            source,
            month_filter,
            should_quit: false,
            last_data: None,
            funnel: FunnelSummary::default(),
            compare_left: 0,
            compare_right: 1,
            last_refresh: None,
        }
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Run the interactive dashboard TUI, receiving snapshots from `rx`.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while data
    /// updates arrive on the async channel via `try_recv`.
    ///
    /// Keys: `q` / `Ctrl+C` quit, `Tab` cycles views, `o`/`f`/`c` jump to a
    /// view, `m` cycles the month filter, `n`/`p` cycle the comparison
    /// cohorts.
    pub async fn run(mut self, mut rx: mpsc::Receiver<DashboardData>) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard events with a short timeout so we don't block.
            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break Ok(());
                        }
                        KeyCode::Char('q') | KeyCode::Char('Q') => break Ok(()),
                        KeyCode::Tab => self.view_mode = self.view_mode.next(),
                        KeyCode::Char('o') | KeyCode::Char('O') => {
                            self.view_mode = ViewMode::Overview;
                        }
                        KeyCode::Char('f') | KeyCode::Char('F') => {
                            self.view_mode = ViewMode::Funnel;
                        }
                        KeyCode::Char('c') | KeyCode::Char('C') => {
                            self.view_mode = ViewMode::Compare;
                        }
                        KeyCode::Char('m') | KeyCode::Char('M') => self.cycle_month(),
                        KeyCode::Char('n') | KeyCode::Char('N') => self.cycle_compare_right(),
                        KeyCode::Char('p') | KeyCode::Char('P') => self.cycle_compare_left(),
                        _ => {}
                    }
                }
            }

            // Drain any pending data updates (non-blocking).
            loop {
                match rx.try_recv() {
                    Ok(data) => self.update_from_dashboard(data),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Snapshot intake ───────────────────────────────────────────────────────

    /// Store an incoming snapshot and recompute the local funnel summary.
    pub fn update_from_dashboard(&mut self, data: DashboardData) {
        self.funnel = aggregate_funnel(
            &data.analysis.table,
            &columns::DEFAULT_FUNNEL,
            &self.month_filter,
        );
        self.clamp_compare_indices(data.analysis.cohort_labels.len());
        self.last_refresh = Some(chrono::Local::now());
        self.last_data = Some(data);
    }

    /// Advance the month filter: all months, then each month in file order,
    /// then back to all months. A multi-month restriction from the command
    /// line clears on the first press.
    pub fn cycle_month(&mut self) {
        let months: Vec<String> = match self.last_data {
            Some(ref data) => data.analysis.months.clone(),
            None => return,
        };
        if months.is_empty() {
            return;
        }

        self.month_filter = match self.month_filter.as_slice() {
            [] => vec![months[0].clone()],
            [current] => match months.iter().position(|m| m == current) {
                Some(idx) if idx + 1 < months.len() => vec![months[idx + 1].clone()],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        self.recompute_funnel();
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn recompute_funnel(&mut self) {
        if let Some(ref data) = self.last_data {
            self.funnel = aggregate_funnel(
                &data.analysis.table,
                &columns::DEFAULT_FUNNEL,
                &self.month_filter,
            );
        }
    }

    fn cycle_compare_right(&mut self) {
        if let Some(ref data) = self.last_data {
            let count = data.analysis.cohort_labels.len();
            if count > 0 {
                self.compare_right = (self.compare_right + 1) % count;
            }
        }
    }

    fn cycle_compare_left(&mut self) {
        if let Some(ref data) = self.last_data {
            let count = data.analysis.cohort_labels.len();
            if count > 0 {
                self.compare_left = (self.compare_left + 1) % count;
            }
        }
    }

    fn clamp_compare_indices(&mut self, count: usize) {
        if count == 0 {
            self.compare_left = 0;
            self.compare_right = 0;
        } else {
            self.compare_left %= count;
            self.compare_right %= count;
        }
    }

    /// The cohort labels currently selected for comparison, or `None` when no
    /// cohorts are loaded.
    fn compare_pair(&self) -> Option<(String, String)> {
        let data = self.last_data.as_ref()?;
        let labels = &data.analysis.cohort_labels;
        if labels.is_empty() {
            return None;
        }
        let left = labels[self.compare_left % labels.len()].clone();
        let right = labels[self.compare_right % labels.len()].clone();
        Some((left, right))
    }

    /// Render the current application state into `frame`.
    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        self.render_body(frame, chunks[1]);
        self.render_footer(frame, chunks[2]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let month_label = if self.month_filter.is_empty() {
            None
        } else {
            Some(self.month_filter.join(", "))
        };
        let header = Header::new(
            self.view_mode.label(),
            &self.source,
            month_label.as_deref(),
            &self.theme,
        );
        frame.render_widget(Paragraph::new(header.to_lines()), area);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        let data = match self.last_data {
            Some(ref data) => data,
            None => {
                table_view::render_no_data(frame, area, &self.theme);
                return;
            }
        };

        match self.view_mode {
            ViewMode::Overview => {
                let rows = table_view::cohort_rows(&data.analysis.table);
                if rows.is_empty() {
                    table_view::render_no_data(frame, area, &self.theme);
                } else {
                    table_view::render_overview_table(
                        frame,
                        area,
                        "Cohort Performance",
                        &rows,
                        &data.analysis.overview,
                        &self.theme,
                    );
                }
            }
            ViewMode::Funnel => {
                funnel_view::render_funnel_view(frame, area, &self.funnel, &self.theme);
            }
            ViewMode::Compare => match self.compare_pair() {
                Some((left, right)) => {
                    let comparison =
                        compare_cohorts(&data.analysis.table, &left, &right, &columns::NUMERIC);
                    compare_view::render_compare_view(frame, area, &comparison, &self.theme);
                }
                None => table_view::render_no_data(frame, area, &self.theme),
            },
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            " q quit | tab view | m month | n/p cohorts",
            self.theme.dim,
        )];

        if let Some(refreshed) = self.last_refresh {
            spans.push(Span::styled(
                format!("  updated {}", refreshed.format("%H:%M:%S")),
                self.theme.dim,
            ));
        }

        if let Some(error) = self.last_data.as_ref().and_then(|d| d.last_error.as_deref()) {
            spans.push(Span::styled(
                format!("  stale: {error}"),
                self.theme.warning,
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
