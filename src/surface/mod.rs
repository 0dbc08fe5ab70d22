//! Chart surface: owns one live chart engine bound to a screen region.
//!
//! Lifecycle is `Uninitialized -> Mounted -> Disposed`. While mounted, every
//! update rebuilds a `ChartSpec` and applies it to the same engine. Disposal
//! releases the engine exactly once, either explicitly or on drop, so the
//! engine is released on every exit path of the owner.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use tracing::{debug, warn};

use crate::chart::{ChartSpec, build};
use crate::domain::{Device, Metric, NormalizedSeries, SeriesMode};
use crate::error::{RENDER_FAILED_MESSAGE, RenderError};

/// Shown instead of an empty chart frame.
pub const NO_DATA_MESSAGE: &str = "No data available";

/// A chart rendering engine instance.
pub trait ChartEngine {
    /// Replace the current configuration. On error the previous one stays active.
    fn set_option(&mut self, spec: &ChartSpec) -> Result<(), RenderError>;

    /// Recompute layout for a new container size.
    fn resize(&mut self, width: u16, height: u16);

    /// Highlight one category (hover), or none.
    fn highlight(&mut self, _category: Option<usize>) {}

    /// Draw the active configuration into `area`.
    fn draw(&self, area: Rect, buf: &mut Buffer);

    /// Release the instance. Called exactly once by the surface.
    fn dispose(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    Uninitialized,
    Mounted,
    Disposed,
}

enum Slot<E> {
    Uninitialized,
    Mounted(E),
    Disposed,
}

/// What the surface currently displays.
#[derive(Debug, Clone, PartialEq)]
enum Content {
    Nothing,
    Placeholder,
    Chart(ChartSpec),
}

/// Read-only view of the surface for the host and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceView<'a> {
    Unmounted,
    Nothing,
    Placeholder(&'static str),
    Chart {
        spec: &'a ChartSpec,
        error: Option<&'static str>,
    },
    Error(&'static str),
}

pub struct ChartSurface<E: ChartEngine> {
    slot: Slot<E>,
    bounds: Option<(u16, u16)>,
    content: Content,
    error: Option<&'static str>,
    hover: Option<usize>,
}

impl<E: ChartEngine> Default for ChartSurface<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ChartEngine> ChartSurface<E> {
    pub fn new() -> Self {
        Self {
            slot: Slot::Uninitialized,
            bounds: None,
            content: Content::Nothing,
            error: None,
            hover: None,
        }
    }

    pub fn phase(&self) -> SurfacePhase {
        match self.slot {
            Slot::Uninitialized => SurfacePhase::Uninitialized,
            Slot::Mounted(_) => SurfacePhase::Mounted,
            Slot::Disposed => SurfacePhase::Disposed,
        }
    }

    /// Bind an engine to a container of the given size.
    ///
    /// A disposed surface cannot be mounted again; create a new surface with a
    /// fresh engine instead.
    pub fn mount(&mut self, mut engine: E, width: u16, height: u16) -> Result<(), RenderError> {
        match self.slot {
            Slot::Uninitialized => {
                engine.resize(width, height);
                self.bounds = Some((width, height));
                self.slot = Slot::Mounted(engine);
                debug!(width, height, "chart surface mounted");
                Ok(())
            }
            Slot::Mounted(_) => Err(RenderError::AlreadyMounted),
            Slot::Disposed => Err(RenderError::Disposed),
        }
    }

    /// Show `series` for the given context. Ignored unless mounted.
    pub fn update(&mut self, series: &NormalizedSeries, metric: Metric, device: Device, mode: SeriesMode) {
        let Slot::Mounted(engine) = &mut self.slot else {
            debug!(phase = ?self.phase(), "chart update ignored");
            return;
        };

        if series.is_empty() {
            self.content = Content::Placeholder;
            self.error = None;
            return;
        }

        let spec = build(series, metric, device, mode);
        if matches!(&self.content, Content::Chart(current) if *current == spec) {
            // Already on screen; a rejection since then no longer applies.
            self.error = None;
            return;
        }

        match engine.set_option(&spec) {
            Ok(()) => {
                if self.hover.is_some_and(|i| i >= spec.categories().len()) {
                    self.hover = None;
                    engine.highlight(None);
                }
                self.content = Content::Chart(spec);
                self.error = None;
            }
            Err(err) => {
                warn!(error = %err, "chart configuration rejected");
                self.error = Some(RENDER_FAILED_MESSAGE);
                // Keep the last good frame; anything else gives way to the error.
                if !matches!(self.content, Content::Chart(_)) {
                    self.content = Content::Nothing;
                }
            }
        }
    }

    /// Container resize signal. Returns whether the engine was asked to relayout.
    pub fn observe_bounds(&mut self, width: u16, height: u16) -> bool {
        let Slot::Mounted(engine) = &mut self.slot else {
            return false;
        };
        if self.bounds == Some((width, height)) {
            return false;
        }
        debug!(width, height, "chart surface resized");
        engine.resize(width, height);
        self.bounds = Some((width, height));
        true
    }

    /// Move the hover cursor by `delta` categories, clamped to the chart.
    pub fn move_hover(&mut self, delta: isize) {
        let n = match &self.content {
            Content::Chart(spec) => spec.categories().len(),
            _ => 0,
        };
        let Slot::Mounted(engine) = &mut self.slot else {
            return;
        };
        if n == 0 {
            return;
        }
        let next = match self.hover {
            None if delta < 0 => n - 1,
            None => 0,
            Some(i) => (i as isize + delta).clamp(0, n as isize - 1) as usize,
        };
        self.hover = Some(next);
        engine.highlight(self.hover);
    }

    /// Tooltip text for the hovered category.
    pub fn tooltip(&self) -> Option<Vec<String>> {
        match (&self.content, self.hover) {
            (Content::Chart(spec), Some(i)) => spec.tooltip_lines(i),
            _ => None,
        }
    }

    pub fn view(&self) -> SurfaceView<'_> {
        if !matches!(self.slot, Slot::Mounted(_)) {
            return SurfaceView::Unmounted;
        }
        match (&self.content, self.error) {
            (Content::Chart(spec), error) => SurfaceView::Chart { spec, error },
            (Content::Placeholder, _) => SurfaceView::Placeholder(NO_DATA_MESSAGE),
            (Content::Nothing, Some(error)) => SurfaceView::Error(error),
            (Content::Nothing, None) => SurfaceView::Nothing,
        }
    }

    /// Draw the current content into `area`, relayouting first if it changed size.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        self.observe_bounds(area.width, area.height);
        let Slot::Mounted(engine) = &self.slot else {
            return;
        };

        let message = |buf: &mut Buffer, text: &str, color: Color| {
            let x = area.x + area.width.saturating_sub(text.len() as u16) / 2;
            let y = area.y + area.height / 2;
            if area.height > 0 {
                buf.set_string(x, y, text, Style::default().fg(color));
            }
        };

        match (&self.content, self.error) {
            (Content::Chart(_), error) => {
                engine.draw(area, buf);
                if let Some(error) = error {
                    buf.set_string(area.x, area.y, error, Style::default().fg(Color::Red));
                }
            }
            (Content::Placeholder, _) => message(buf, NO_DATA_MESSAGE, Color::Gray),
            (Content::Nothing, Some(error)) => message(buf, error, Color::Red),
            (Content::Nothing, None) => {}
        }
    }

    /// Release the engine. Safe to call more than once; the engine sees one call.
    pub fn dispose(&mut self) {
        if let Slot::Mounted(mut engine) = std::mem::replace(&mut self.slot, Slot::Disposed) {
            engine.dispose();
            debug!("chart surface disposed");
        }
        self.content = Content::Nothing;
        self.error = None;
        self.hover = None;
    }
}

impl<E: ChartEngine> Drop for ChartSurface<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}
