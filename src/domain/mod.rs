//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - selection enums (`Metric`, `Device`) and the `MetricSelection` pair
//! - the series mode (`SeriesMode`) and fixed multi-channel names (`Channel`)
//! - normalized series values (`NormalizedPoint`, `NormalizedSeries`)
//! - run configuration (`ReportConfig`)

pub mod types;

pub use types::*;
