//! Ratatui-based terminal UI.
//!
//! The TUI is the selection host: a settings panel chooses metric, device and
//! series mode; every selection change starts a fetch cycle, and the result is
//! rendered through the chart surface.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::info;

use crate::data::source_from_config;
use crate::domain::{MetricSelection, ReportConfig};
use crate::error::AppError;
use crate::fetch::{FetchController, FetchWorker, HostView};
use crate::surface::{ChartSurface, SurfacePhase};

mod plotters_chart;

pub use plotters_chart::PlottersEngine;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const FIELD_COUNT: usize = 3;
const BRAND: &str = "SpeedVitals";

/// Start the TUI.
pub fn run(config: ReportConfig) -> Result<(), AppError> {
    let source = source_from_config(&config)?;
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, FetchWorker::new(source));
    let result = app.event_loop(&mut terminal);
    app.surface.dispose();
    result
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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

struct App {
    config: ReportConfig,
    selected_field: usize,
    status: String,
    controller: FetchController,
    worker: FetchWorker,
    view: HostView,
    surface: ChartSurface<PlottersEngine>,
    tick: usize,
}

impl App {
    fn new(config: ReportConfig, worker: FetchWorker) -> Self {
        let controller = FetchController::new();
        let view = controller.view(config.mode);
        let mut app = Self {
            config,
            selected_field: 0,
            status: String::new(),
            controller,
            worker,
            view,
            surface: ChartSurface::new(),
            tick: 0,
        };
        app.start_fetch();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.apply_fetch_results() {
                needs_redraw = true;
            }
            if self.view.loading {
                self.tick = self.tick.wrapping_add(1);
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                // Viewport resize; the surface re-measures its area on the next draw.
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply every result that arrived since the last tick. Returns whether the
    /// visible state changed.
    fn apply_fetch_results(&mut self) -> bool {
        let mut changed = false;
        for (ticket, result) in self.worker.drain() {
            if self.controller.resolve(ticket, result) {
                changed = true;
            }
        }
        if changed {
            self.refresh_view();
        }
        changed
    }

    fn refresh_view(&mut self) {
        self.view = self.controller.view(self.config.mode);
        self.status = match (&self.view.error, &self.view.series) {
            (Some(_), _) => "Fetch failed. Change the selection or press r to retry.".to_string(),
            (None, Some(series)) => format!("{} points", series.len()),
            (None, None) => "Loading...".to_string(),
        };
    }

    fn start_fetch(&mut self) {
        let ticket = self.controller.begin(self.config.selection);
        self.worker.spawn(ticket);
        self.refresh_view();
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('r') => {
                info!(selection = %self.config.selection, "manual refresh");
                self.start_fetch();
            }
            KeyCode::Char('h') => self.surface.move_hover(-1),
            KeyCode::Char('l') => self.surface.move_hover(1),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i32) {
        let MetricSelection { metric, device } = self.config.selection;
        match self.selected_field {
            0 => {
                let metric = if delta >= 0 { metric.next() } else { metric.prev() };
                self.select(MetricSelection::new(metric, device));
            }
            1 => {
                let device = if delta >= 0 { device.next() } else { device.prev() };
                self.select(MetricSelection::new(metric, device));
            }
            2 => {
                // Mode is presentation only: re-normalize what we already have.
                self.config.mode = self.config.mode.toggle();
                info!(mode = self.config.mode.display_name(), "series mode changed");
                self.refresh_view();
            }
            _ => {}
        }
    }

    fn select(&mut self, selection: MetricSelection) {
        if selection == self.config.selection {
            return;
        }
        info!(%selection, "selection changed");
        self.config.selection = selection;
        self.start_fetch();
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled(
                    BRAND,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(
                    "Performance Report",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!(
                    "{} | mode: {} | source: {} | fetch #{}",
                    self.config.selection,
                    self.config.mode.display_name(),
                    self.worker.source().describe(),
                    self.controller.generation(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(28)])
            .split(area);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(chunks[1]);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, side[0]);
        self.draw_tooltip(frame, side[1]);
    }

    fn draw_chart(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Chart").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.view.loading {
            let spinner = SPINNER[self.tick % SPINNER.len()];
            let msg = Paragraph::new(format!("{spinner} Loading..."))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, centered_row(inner));
            return;
        }

        if let Some(error) = &self.view.error {
            let msg = Paragraph::new(Line::from(vec![
                Span::styled("Error: ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::styled(error.as_str(), Style::default().fg(Color::Red)),
            ]))
            .alignment(Alignment::Center);
            frame.render_widget(msg, centered_row(inner));
            return;
        }

        let Some(series) = &self.view.series else {
            return;
        };

        // The chart container exists from here on; mount once.
        if self.surface.phase() == SurfacePhase::Uninitialized {
            if let Err(e) = self.surface.mount(PlottersEngine::new(), inner.width, inner.height) {
                self.status = format!("Chart unavailable: {e}");
                return;
            }
        }
        let MetricSelection { metric, device } = self.config.selection;
        self.surface.update(series, metric, device, self.config.mode);
        self.surface.render(inner, frame.buffer_mut());
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Metric: {}", self.config.selection.metric.display_name())),
            ListItem::new(format!("Device: {}", self.config.selection.device.display_name())),
            ListItem::new(format!("Mode:   {}", self.config.mode.display_name())),
        ];

        let list = List::new(items)
            .block(Block::default().title("Selection").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_tooltip(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines: Vec<Line> = match self.surface.tooltip() {
            Some(lines) => lines
                .into_iter()
                .enumerate()
                .map(|(i, l)| {
                    let style = if i == 0 {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    Line::from(Span::styled(l, style))
                })
                .collect(),
            None => vec![Line::from(Span::styled(
                "h/l to inspect a date",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Tooltip").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ change  h/l hover  r refresh  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// One-row rect in the vertical middle of `area`.
fn centered_row(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + area.height / 2,
        width: area.width,
        height: area.height.min(1),
    }
}
