//! Declarative chart description.
//!
//! A `ChartSpec` says what to draw, not how. It serializes to the same layout
//! as an ECharts option object (`title.text`, `xAxis.data`, `series[].stack`,
//! ...), so an exported spec can be fed to a browser chart as-is.

use std::collections::HashMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub title: Title,
    pub tooltip: Tooltip,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    pub x_axis: CategoryAxis,
    pub y_axis: ValueAxis,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub left: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipTrigger {
    /// Hovering a category shows every series at that category.
    Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub trigger: TooltipTrigger,
    /// Fixed number of decimals, or the shortest exact form when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<usize>,
}

impl Tooltip {
    pub fn format_value(&self, v: f64) -> String {
        match self.decimals {
            Some(d) => format!("{v:.d$}"),
            None => format!("{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAxis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueAxis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Series sharing a stack key are drawn on top of each other.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub smooth: bool,
    pub color: String,
    pub data: Vec<f64>,
}

impl ChartSpec {
    pub fn categories(&self) -> &[String] {
        &self.x_axis.data
    }

    /// Values as drawn: stacked series are accumulated per stack key in
    /// series order; unstacked series are returned unchanged.
    pub fn stacked_values(&self) -> Vec<Vec<f64>> {
        let mut totals: HashMap<&str, Vec<f64>> = HashMap::new();
        self.series
            .iter()
            .map(|s| match &s.stack {
                None => s.data.clone(),
                Some(key) => {
                    let acc = totals
                        .entry(key.as_str())
                        .or_insert_with(|| vec![0.0; s.data.len()]);
                    if acc.len() < s.data.len() {
                        acc.resize(s.data.len(), 0.0);
                    }
                    for (a, v) in acc.iter_mut().zip(&s.data) {
                        *a += v;
                    }
                    acc[..s.data.len()].to_vec()
                }
            })
            .collect()
    }

    /// Y range covering every drawn value and zero, padded by 5%.
    pub fn value_bounds(&self) -> [f64; 2] {
        let (mut lo, mut hi) = (0.0_f64, 0.0_f64);
        for v in self.stacked_values().iter().flatten() {
            if v.is_finite() {
                lo = lo.min(*v);
                hi = hi.max(*v);
            }
        }
        if hi <= lo {
            return [0.0, 1.0];
        }
        let pad = (hi - lo) * 0.05;
        [if lo < 0.0 { lo - pad } else { lo }, hi + pad]
    }

    /// Tooltip text for one category: the date label, then one line per series.
    pub fn tooltip_lines(&self, index: usize) -> Option<Vec<String>> {
        let label = self.x_axis.data.get(index)?;
        let mut lines = Vec::with_capacity(self.series.len() + 1);
        lines.push(label.clone());
        for s in &self.series {
            let value = s.data.get(index).copied().unwrap_or(0.0);
            lines.push(format!("{}: {}", s.name, self.tooltip.format_value(value)));
        }
        Some(lines)
    }
}
