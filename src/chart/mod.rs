//! Chart configuration builder.
//!
//! `build` is a pure function from a normalized series plus its context to a
//! `ChartSpec`. It borrows the series and returns a fresh value every call.

use crate::domain::{Channel, Device, Metric, NormalizedSeries, SeriesMode, VALUE_CHANNEL};

pub mod spec;

pub use spec::{
    CategoryAxis, ChartSpec, Legend, LineSeries, Title, Tooltip, TooltipTrigger, ValueAxis,
};

/// Line color of the single-channel series.
pub const SINGLE_SERIES_COLOR: &str = "#2563eb";
/// Stack key shared by all multi-channel series.
pub const STACK_KEY: &str = "Total";

pub fn build(series: &NormalizedSeries, metric: Metric, device: Device, mode: SeriesMode) -> ChartSpec {
    let categories: Vec<String> = series.dates().map(str::to_string).collect();

    match mode {
        SeriesMode::Single => ChartSpec {
            title: Title {
                text: metric.display_name().to_string(),
                left: "center",
            },
            tooltip: Tooltip {
                trigger: TooltipTrigger::Axis,
                decimals: None,
            },
            legend: None,
            x_axis: category_axis(categories),
            y_axis: ValueAxis {
                kind: "value",
                name: Some(metric.y_axis_name().to_string()),
            },
            series: vec![LineSeries {
                name: metric.display_name().to_string(),
                kind: "line",
                stack: None,
                smooth: true,
                color: SINGLE_SERIES_COLOR.to_string(),
                data: channel_values(series, VALUE_CHANNEL),
            }],
        },
        SeriesMode::Multi => ChartSpec {
            title: Title {
                text: format!("{} ({})", metric.display_name(), device.display_name()),
                left: "center",
            },
            tooltip: Tooltip {
                trigger: TooltipTrigger::Axis,
                decimals: Some(2),
            },
            legend: Some(Legend {
                data: Channel::ALL.iter().map(|c| c.key().to_string()).collect(),
            }),
            x_axis: category_axis(categories),
            y_axis: ValueAxis {
                kind: "value",
                name: None,
            },
            series: Channel::ALL
                .iter()
                .map(|c| LineSeries {
                    name: c.key().to_string(),
                    kind: "line",
                    stack: Some(STACK_KEY.to_string()),
                    smooth: false,
                    color: c.color().to_string(),
                    data: channel_values(series, c.key()),
                })
                .collect(),
        },
    }
}

fn category_axis(data: Vec<String>) -> CategoryAxis {
    CategoryAxis {
        kind: "category",
        data,
    }
}

fn channel_values(series: &NormalizedSeries, channel: &str) -> Vec<f64> {
    series.points().iter().map(|p| p.value(channel)).collect()
}
