//! Ratatui-based terminal UI.
//!
//! The TUI shows the KPI panel and both weekly charts next to two checkbox
//! lists (status and contributor). Every toggle re-runs filter + aggregate over
//! the memoized tables; `r` drops the cache and fetches the sheets again.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::{self, RunOutput};
use crate::data::{HttpSheetSource, LoadCache, SheetSource, SourceTables, SourcesConfig};
use crate::domain::{DashboardConfig, FilterSelection};
use crate::error::AppError;
use crate::report::{deal_bars, fmt_count, fmt_money, kpis, spend_bars};

mod filters;
mod plotters_chart;

use filters::MultiSelect;
use plotters_chart::WeeklyBarChart;

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    // Configuration problems should print like any other CLI error, so
    // resolve them before the terminal switches to the alternate screen.
    let sources = SourcesConfig::from_env()?;
    let source = HttpSheetSource::new(config.fetch_timeout)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::Terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, source, sources);
    app.reload();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::Terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::Terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Status,
    Name,
}

struct App<S: SheetSource> {
    config: DashboardConfig,
    source: S,
    sources: SourcesConfig,
    cache: LoadCache,
    tables: Option<Arc<SourceTables>>,
    statuses: MultiSelect,
    names: MultiSelect,
    focus: Focus,
    run: Option<RunOutput>,
    status: String,
}

impl<S: SheetSource> App<S> {
    fn new(config: DashboardConfig, source: S, sources: SourcesConfig) -> Self {
        let cache = LoadCache::new(config.cache_ttl);
        Self {
            config,
            source,
            sources,
            cache,
            tables: None,
            statuses: MultiSelect::new("Status"),
            names: MultiSelect::new("Name"),
            focus: Focus::Status,
            run: None,
            status: "Fetching sheets...".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::Terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::Terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::Terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Status => Focus::Name,
                    Focus::Name => Focus::Status,
                };
            }
            KeyCode::Up => self.focused_mut().move_cursor(-1),
            KeyCode::Down => self.focused_mut().move_cursor(1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.focused_mut().toggle();
                self.recompute();
            }
            KeyCode::Char('a') => {
                self.focused_mut().set_all(true);
                self.recompute();
            }
            KeyCode::Char('n') => {
                self.focused_mut().set_all(false);
                self.recompute();
            }
            KeyCode::Char('r') => {
                self.cache.invalidate();
                self.reload();
            }
            _ => {}
        }
        false
    }

    fn focused_mut(&mut self) -> &mut MultiSelect {
        match self.focus {
            Focus::Status => &mut self.statuses,
            Focus::Name => &mut self.names,
        }
    }

    /// Load (or reuse) the tables and refresh the widget options.
    ///
    /// Failures stay on screen; the previous data is kept and `r` retries.
    fn reload(&mut self) {
        match self.current_tables() {
            Ok(tables) => self.adopt(tables),
            Err(err) => {
                tracing::warn!(error = %err, "sheet load failed");
                self.status = format!("Load failed: {err} (press r to retry)");
            }
        }
    }

    fn current_tables(&self) -> Result<Arc<SourceTables>, AppError> {
        let sources = &self.sources;
        pipeline::load_cached(&self.source, &self.cache, || Ok(sources.clone()))
    }

    /// Switch to a newly loaded table set. Options that appear for the first
    /// time join the lists before anything is aggregated.
    fn adopt(&mut self, tables: Arc<SourceTables>) {
        let statuses = crate::analytics::observed_statuses(&tables.deals);
        let names = crate::analytics::observed_contributors(&tables.deals);
        self.statuses.sync(&statuses, self.config.statuses.as_deref());
        self.names.sync(&names, self.config.contributors.as_deref());

        self.status = format!(
            "Loaded {} deals, {} purchases at {}",
            tables.deals.len(),
            tables.purchases.len(),
            tables.loaded_at.format("%H:%M:%S"),
        );
        self.tables = Some(tables);
        self.aggregate();
    }

    /// Re-run filter + aggregate for the current widget state.
    fn recompute(&mut self) {
        // An expired entry is refetched here; a fresh one is reused.
        if self.config.cache_ttl.is_some() {
            match self.current_tables() {
                Ok(tables) => {
                    let changed = self
                        .tables
                        .as_ref()
                        .is_none_or(|current| !Arc::ptr_eq(current, &tables));
                    if changed {
                        self.adopt(tables);
                        return;
                    }
                }
                Err(err) => {
                    self.status = format!("Refresh failed: {err} (showing previous data)");
                }
            }
        }
        self.aggregate();
    }

    fn aggregate(&mut self) {
        let Some(tables) = &self.tables else {
            return;
        };
        let selection = FilterSelection {
            statuses: self.statuses.selected(),
            contributors: self.names.selected(),
        };
        match pipeline::run_with_selection(tables, selection, self.config.window) {
            Ok(run) => self.run = Some(run),
            Err(err) => {
                tracing::warn!(error = %err, "aggregation failed");
                self.run = None;
                self.status = format!("{err} (fix the sheet, then press r)");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Deals Dashboard").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(run) = &self.run else {
            let msg =
                Paragraph::new("Waiting for data...").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let k = kpis(&run.snapshot);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(inner);

        for (col, rect) in columns.iter().enumerate() {
            let mut lines = Vec::new();
            for kpi in &k[col * 2..col * 2 + 2] {
                lines.push(Line::from(vec![
                    Span::styled(format!("{}: ", kpi.label), Style::default().fg(Color::Gray)),
                    Span::styled(kpi.value.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ]));
            }
            frame.render_widget(Paragraph::new(Text::from(lines)), *rect);
        }

        if run.snapshot.success_rate.is_none() && inner.height > 2 {
            let hint = Paragraph::new("No deals match the current filter selection.")
                .style(Style::default().fg(Color::Yellow));
            let rect = Rect {
                y: inner.y + 2,
                height: 1,
                ..inner
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(area);

        let sidebar = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0]);
        self.draw_filter(frame, sidebar[0], &self.statuses, self.focus == Focus::Status);
        self.draw_filter(frame, sidebar[1], &self.names, self.focus == Focus::Name);

        let charts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        let (deals, spend) = match &self.run {
            Some(run) => (deal_bars(&run.snapshot), spend_bars(&run.snapshot)),
            None => (Vec::new(), Vec::new()),
        };
        draw_chart(frame, charts[0], "Deals per Week", &deals, "deals", fmt_count);
        draw_chart(frame, charts[1], "Spending per Week", &spend, "total purchase", fmt_money);
    }

    fn draw_filter(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        list: &MultiSelect,
        focused: bool,
    ) {
        let items: Vec<ListItem> = list
            .choices
            .iter()
            .map(|c| {
                let mark = if c.selected { "[x]" } else { "[ ]" };
                ListItem::new(format!("{mark} {}", display_label(&c.label)))
            })
            .collect();

        let border = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let title = format!("{} ({}/{})", list.title, list.selected_count(), list.choices.len());
        let widget = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL).border_style(border))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if focused && !list.choices.is_empty() {
            state.select(Some(list.cursor));
        }
        frame.render_stateful_widget(widget, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab switch  ↑/↓ move  Space toggle  a all  n none  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_chart(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    bars: &[(&str, f64)],
    x_label: &str,
    fmt_x: fn(f64) -> String,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    frame.render_widget(WeeklyBarChart { bars, x_label, fmt_x }, inner);
}

fn display_label(label: &str) -> &str {
    if label.is_empty() { "(blank)" } else { label }
}
