//! Plotters-powered chart engine for Ratatui.
//!
//! Plotters draws the series and gridlines into the Ratatui buffer via
//! `plotters-ratatui-backend`; title, legend, category labels and y ticks are
//! written as plain text around the plot area, which keeps them crisp in a
//! terminal.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::chart::ChartSpec;
use crate::error::RenderError;
use crate::surface::ChartEngine;

/// Spec that passed validation, with everything `draw` needs precomputed.
struct Prepared {
    spec: ChartSpec,
    colors: Vec<(u8, u8, u8)>,
    stacked: Vec<Vec<f64>>,
    y_bounds: [f64; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

/// Layout derived from the container size and the active spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EngineLayout {
    /// `None` when the area is too small for axes.
    insets: Option<AxisInsets>,
    /// Draw every n-th category label.
    label_stride: usize,
}

#[derive(Default)]
pub struct PlottersEngine {
    prepared: Option<Prepared>,
    size: (u16, u16),
    layout: Option<EngineLayout>,
    highlight: Option<usize>,
    disposed: bool,
}

impl PlottersEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn relayout(&mut self) {
        let (width, height) = self.size;
        let (categories, has_legend) = match &self.prepared {
            Some(p) => (p.spec.categories().len(), p.spec.legend.is_some()),
            None => (0, false),
        };
        self.layout = Some(compute_layout(width, height, categories, has_legend));
    }
}

impl ChartEngine for PlottersEngine {
    fn set_option(&mut self, spec: &ChartSpec) -> Result<(), RenderError> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }
        let prepared = prepare(spec)?;
        self.prepared = Some(prepared);
        self.relayout();
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.relayout();
    }

    fn highlight(&mut self, category: Option<usize>) {
        self.highlight = category;
    }

    fn draw(&self, area: Rect, buf: &mut Buffer) {
        let (Some(p), Some(layout)) = (&self.prepared, self.layout) else {
            return;
        };
        if self.disposed {
            return;
        }

        draw_title(&p.spec, area, buf);
        if p.spec.legend.is_some() {
            draw_legend(p, area, buf);
        }

        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        let Some(insets) = layout.insets else {
            buf.set_string(
                area.x,
                area.y + area.height.saturating_sub(1),
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        };

        let chart_rect = Rect {
            x: area.x + insets.left,
            y: area.y + insets.top,
            width: area.width - insets.left - insets.right,
            height: area.height - insets.top - insets.bottom,
        };

        if p.spec.categories().is_empty() {
            return;
        }
        let n = p.spec.categories().len() as f64;
        let [y0, y1] = p.y_bounds;
        let highlight = self.highlight;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(0)
                .build_cartesian_2d(0.0..n, y0..y1)?;

            // Horizontal gridlines only; category and value labels are drawn as text.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(0)
                .y_labels(5)
                .light_line_style(&RGBColor(64, 64, 64))
                .bold_line_style(&RGBColor(64, 64, 64))
                .draw()?;

            if let Some(i) = highlight {
                let x = i as f64 + 0.5;
                chart.draw_series(LineSeries::new([(x, y0), (x, y1)], &RGBColor(128, 128, 128)))?;
            }

            for (values, &(r, g, b)) in p.stacked.iter().zip(&p.colors) {
                let color = RGBColor(r, g, b);
                let points: Vec<(f64, f64)> = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i as f64 + 0.5, *v))
                    .collect();
                chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
                // `Circle` radii map badly through the terminal backend; a pixel is a clean dot.
                chart.draw_series(points.iter().map(|&pt| Pixel::new(pt, WHITE)))?;
            }

            Ok(())
        });

        widget.render(chart_rect, buf);
        draw_axis_ticks(p, area, chart_rect, insets, layout.label_stride, buf);
    }

    fn dispose(&mut self) {
        self.prepared = None;
        self.layout = None;
        self.highlight = None;
        self.disposed = true;
    }
}

fn prepare(spec: &ChartSpec) -> Result<Prepared, RenderError> {
    if spec.series.is_empty() {
        return Err(RenderError::NoSeries);
    }
    let expected = spec.categories().len();
    let mut colors = Vec::with_capacity(spec.series.len());
    for s in &spec.series {
        if s.data.len() != expected {
            return Err(RenderError::LengthMismatch {
                series: s.name.clone(),
                expected,
                got: s.data.len(),
            });
        }
        if s.data.iter().any(|v| !v.is_finite()) {
            return Err(RenderError::NonFinite { series: s.name.clone() });
        }
        let rgb = parse_hex_color(&s.color).ok_or_else(|| RenderError::InvalidColor {
            series: s.name.clone(),
            color: s.color.clone(),
        })?;
        colors.push(rgb);
    }

    Ok(Prepared {
        spec: spec.clone(),
        colors,
        stacked: spec.stacked_values(),
        y_bounds: spec.value_bounds(),
    })
}

/// `#rrggbb` to RGB.
fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn compute_layout(width: u16, height: u16, categories: usize, has_legend: bool) -> EngineLayout {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        // Title, plus a legend row when present.
        top: if has_legend { 2 } else { 1 },
        // Category labels, plus one spare row.
        bottom: 2,
    };

    if width <= insets.left + insets.right + 10 || height <= insets.top + insets.bottom + 5 {
        return EngineLayout {
            insets: None,
            label_stride: 1,
        };
    }

    // Leave roughly 8 columns per visible category label.
    let plot_width = (width - insets.left - insets.right) as usize;
    let max_labels = (plot_width / 8).max(1);
    let label_stride = categories.div_ceil(max_labels).max(1);

    EngineLayout {
        insets: Some(insets),
        label_stride,
    }
}

fn draw_title(spec: &ChartSpec, area: Rect, buf: &mut Buffer) {
    let title = &spec.title.text;
    let x = area.x + area.width.saturating_sub(title.chars().count() as u16) / 2;
    buf.set_string(
        x,
        area.y,
        title,
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    );
}

fn draw_legend(p: &Prepared, area: Rect, buf: &mut Buffer) {
    if area.height < 2 {
        return;
    }
    let y = area.y + 1;
    let right = area.x + area.width;
    let mut x = area.x + 1;
    for (s, &(r, g, b)) in p.spec.series.iter().zip(&p.colors) {
        let entry = format!("■ {}  ", s.name);
        let len = entry.chars().count() as u16;
        if x + len > right {
            break;
        }
        buf.set_string(x, y, "■", Style::default().fg(Color::Rgb(r, g, b)));
        buf.set_string(x + 2, y, &s.name, Style::default().fg(Color::Gray));
        x += len;
    }
}

fn draw_axis_ticks(
    p: &Prepared,
    area: Rect,
    chart: Rect,
    insets: AxisInsets,
    stride: usize,
    buf: &mut Buffer,
) {
    let style = Style::default().fg(Color::Gray);
    let categories = p.spec.categories();
    let n = categories.len();

    // Category labels, centered under each category slot.
    let label_y = chart.y + chart.height;
    if label_y < area.y + area.height {
        for (i, label) in categories.iter().enumerate().step_by(stride) {
            let center = chart.x + ((i as f64 + 0.5) / n as f64 * chart.width as f64) as u16;
            let len = label.chars().count() as u16;
            let start = center.saturating_sub(len / 2).max(chart.x);
            if start + len > chart.x + chart.width {
                continue;
            }
            buf.set_string(start, label_y, label, style);
        }
    }

    // Value ticks on the left.
    let ticks = 5usize;
    let [y0, y1] = p.y_bounds;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let value = y0 + u * (y1 - y0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_tick(value);
        let end = area.x + insets.left.saturating_sub(1);
        let start = end.saturating_sub(label.len() as u16);
        if start < area.x {
            continue;
        }
        buf.set_string(start, y, label, style);
    }

    if let Some(name) = &p.spec.y_axis.name {
        let y = area.y + insets.top.saturating_sub(1);
        let width = insets.left.saturating_sub(1) as usize;
        let name: String = name.chars().take(width).collect();
        buf.set_string(area.x, y, name, style.add_modifier(Modifier::BOLD));
    }
}

fn fmt_tick(v: f64) -> String {
    let mag = v.abs();
    if mag >= 100.0 {
        format!("{v:.0}")
    } else if mag >= 1.0 {
        format!("{v:.1}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::build;
    use crate::data::RawPayload;
    use crate::domain::{Device, Metric, SeriesMode};
    use crate::normalize::normalize;
    use serde_json::json;

    fn spec() -> ChartSpec {
        let raw = RawPayload::parse(json!([{"date": "2001", "value": 1}, {"date": "2002", "value": 3}]));
        build(&normalize(&raw, SeriesMode::Single), Metric::Lcp, Device::Mobile, SeriesMode::Single)
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#2563eb"), Some((0x25, 0x63, 0xeb)));
        assert_eq!(parse_hex_color("2563eb"), None);
        assert_eq!(parse_hex_color("#25g3eb"), None);
        assert_eq!(parse_hex_color("#fff"), None);
    }

    #[test]
    fn rejects_malformed_specs() {
        let mut engine = PlottersEngine::new();

        let mut short = spec();
        short.series[0].data.pop();
        assert!(matches!(engine.set_option(&short), Err(RenderError::LengthMismatch { .. })));

        let mut nan = spec();
        nan.series[0].data[0] = f64::NAN;
        assert!(matches!(engine.set_option(&nan), Err(RenderError::NonFinite { .. })));

        let mut bad_color = spec();
        bad_color.series[0].color = "blue".into();
        assert!(matches!(engine.set_option(&bad_color), Err(RenderError::InvalidColor { .. })));

        let mut no_series = spec();
        no_series.series.clear();
        assert_eq!(engine.set_option(&no_series), Err(RenderError::NoSeries));

        assert!(engine.prepared.is_none());
        assert!(engine.set_option(&spec()).is_ok());
    }

    #[test]
    fn disposed_engine_refuses_specs() {
        let mut engine = PlottersEngine::new();
        engine.dispose();
        assert_eq!(engine.set_option(&spec()), Err(RenderError::Disposed));
    }

    #[test]
    fn layout_follows_size() {
        let small = compute_layout(20, 8, 7, false);
        assert!(small.insets.is_none());

        let wide = compute_layout(120, 30, 7, false);
        assert!(wide.insets.is_some());
        assert_eq!(wide.label_stride, 1);

        let narrow = compute_layout(40, 30, 20, true);
        assert_eq!(narrow.insets.unwrap().top, 2);
        assert!(narrow.label_stride > 1);
    }

    #[test]
    fn resize_recomputes_layout() {
        let mut engine = PlottersEngine::new();
        engine.set_option(&spec()).unwrap();
        engine.resize(20, 8);
        assert!(engine.layout.unwrap().insets.is_none());
        engine.resize(120, 30);
        assert!(engine.layout.unwrap().insets.is_some());
    }

    #[test]
    fn draw_writes_title_and_labels() {
        let mut engine = PlottersEngine::new();
        engine.set_option(&spec()).unwrap();
        engine.resize(60, 20);
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        engine.draw(area, &mut buf);

        let text: String = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("LCP"));
        assert!(text.contains("2001"));
        assert!(text.contains("2002"));
    }
}
