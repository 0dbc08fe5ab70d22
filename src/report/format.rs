//! Terminal formatting for one-shot output.
//!
//! We keep formatting code in one place so the pipeline stays free of
//! presentation details and output changes are localized.

use crate::chart::ChartSpec;
use crate::domain::{MetricSelection, NormalizedSeries, SeriesMode};

/// Header lines: what was fetched and how the chart is set up.
pub fn format_run_summary(
    selection: MetricSelection,
    mode: SeriesMode,
    source: &str,
    spec: Option<&ChartSpec>,
    points: usize,
) -> String {
    let mut out = String::new();

    out.push_str("=== Performance Report ===\n");
    out.push_str(&format!("Selection: {selection}\n"));
    out.push_str(&format!("Mode: {}\n", mode.display_name()));
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!("Points: {points}\n"));

    match spec {
        Some(spec) => {
            out.push_str(&format!("Chart: {}\n", spec.title.text));
            out.push_str(&format!(
                "Y axis: {}\n",
                spec.y_axis.name.as_deref().unwrap_or("-")
            ));
            let names: Vec<&str> = spec.series.iter().map(|s| s.name.as_str()).collect();
            out.push_str(&format!("Series: {}\n", names.join(", ")));
        }
        None => out.push_str("No data available\n"),
    }

    out
}

/// One row per date, one column per series.
///
/// Values use the chart's tooltip formatting so the table and the TUI agree.
pub fn format_series_table(series: &NormalizedSeries, spec: &ChartSpec) -> String {
    let mut out = String::new();
    let date_width = series
        .dates()
        .map(|d| d.chars().count())
        .max()
        .unwrap_or(0)
        .max("date".len());
    let col_width = spec
        .series
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(10);

    let mut header = format!("{:<date_width$}", "date");
    let mut rule = format!("{:-<date_width$}", "");
    for s in &spec.series {
        header.push_str(&format!(" {:>col_width$}", truncate(&s.name, col_width)));
        rule.push_str(&format!(" {:-<col_width$}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for (i, date) in series.dates().enumerate() {
        let mut row = format!("{date:<date_width$}");
        for s in &spec.series {
            let v = s.data.get(i).copied().unwrap_or(0.0);
            row.push_str(&format!(" {:>col_width$}", spec.tooltip.format_value(v)));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
