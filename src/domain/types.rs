//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - passed by value between the UI loop and fetch workers
//! - printed by the one-shot commands
//! - embedded in exported chart specs

use std::collections::BTreeMap;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Web performance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum Metric {
    /// Largest Contentful Paint (seconds).
    Lcp,
    /// Cumulative Layout Shift (unitless score).
    Cls,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Lcp, Metric::Cls];

    /// Label used in titles, series names and query strings.
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Lcp => "LCP",
            Metric::Cls => "CLS",
        }
    }

    /// LCP is time-based; CLS is a score.
    pub fn y_axis_name(self) -> &'static str {
        match self {
            Metric::Lcp => "Seconds",
            Metric::Cls => "Score",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

/// Device class a metric was measured under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Device {
    Mobile,
    Desktop,
}

impl Device {
    pub const ALL: [Device; 2] = [Device::Mobile, Device::Desktop];

    pub fn display_name(self) -> &'static str {
        match self {
            Device::Mobile => "Mobile",
            Device::Desktop => "Desktop",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, -1)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], cur: T, delta: isize) -> T {
    let len = all.len() as isize;
    let idx = all.iter().position(|v| *v == cur).unwrap_or(0) as isize;
    all[(idx + delta).rem_euclid(len) as usize]
}

/// The (metric, device) pair a fetch cycle is tied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricSelection {
    pub metric: Metric,
    pub device: Device,
}

impl MetricSelection {
    pub fn new(metric: Metric, device: Device) -> Self {
        Self { metric, device }
    }
}

impl std::fmt::Display for MetricSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.metric.display_name(), self.device.display_name())
    }
}

/// How payload records are read and charted.
///
/// This is always an explicit choice; it is never inferred from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SeriesMode {
    /// One `value` per date, one line named after the metric.
    Single,
    /// Five named channels per date, drawn as stacked lines.
    Multi,
}

impl SeriesMode {
    pub fn display_name(self) -> &'static str {
        match self {
            SeriesMode::Single => "single",
            SeriesMode::Multi => "multi (stacked)",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SeriesMode::Single => SeriesMode::Multi,
            SeriesMode::Multi => SeriesMode::Single,
        }
    }
}

/// Channel key used by single-channel mode.
pub const VALUE_CHANNEL: &str = "value";

/// The fixed sub-series of multi-channel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Email,
    UnionAds,
    VideoAds,
    Direct,
    SearchEngine,
}

impl Channel {
    /// Chart order; also the stacking order (first channel at the bottom).
    pub const ALL: [Channel; 5] = [
        Channel::Email,
        Channel::UnionAds,
        Channel::VideoAds,
        Channel::Direct,
        Channel::SearchEngine,
    ];

    /// Field name in payload records and series name in the chart.
    pub fn key(self) -> &'static str {
        match self {
            Channel::Email => "Email",
            Channel::UnionAds => "Union Ads",
            Channel::VideoAds => "Video Ads",
            Channel::Direct => "Direct",
            Channel::SearchEngine => "Search Engine",
        }
    }

    /// Fixed series color. Stable across renders.
    pub fn color(self) -> &'static str {
        match self {
            Channel::Email => "#5470c6",
            Channel::UnionAds => "#91cc75",
            Channel::VideoAds => "#fac858",
            Channel::Direct => "#ee6666",
            Channel::SearchEngine => "#73c0de",
        }
    }
}

/// One category of a normalized series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPoint {
    /// Category label. Empty when the record had no usable date.
    pub date: String,
    pub channels: BTreeMap<String, f64>,
}

impl NormalizedPoint {
    /// Value for a channel; absent channels read as zero.
    pub fn value(&self, channel: &str) -> f64 {
        self.channels.get(channel).copied().unwrap_or(0.0)
    }
}

/// Ordered points, in payload order.
///
/// An empty series means "loaded, nothing to show". "Not loaded yet" is a
/// property of the fetch state, not of the series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedSeries {
    points: Vec<NormalizedPoint>,
}

impl NormalizedSeries {
    pub fn new(points: Vec<NormalizedPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[NormalizedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.date.as_str())
    }
}

/// Where payloads come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Locally simulated data.
    Sample,
    /// HTTP endpoint queried with `metric` and `device`.
    Http,
}

/// Resolved configuration for a run (CLI flags + environment).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub selection: MetricSelection,
    pub mode: SeriesMode,
    pub source: SourceKind,
    /// Retrieval endpoint for `SourceKind::Http`.
    pub endpoint: Option<String>,
    /// Per-request timeout for the HTTP source.
    pub timeout: Duration,
    /// Seed for the sample source.
    pub seed: u64,
    /// Artificial delay for the sample source.
    pub sample_latency: Duration,
}
