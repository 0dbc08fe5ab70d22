//! `perf-report` library crate.
//!
//! The binary (`perf-report`) is a thin wrapper around this library so that:
//!
//! - the fetch/normalize/chart pipeline is testable without a terminal
//! - the chart surface can be driven by engines other than the TUI one
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod chart;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod io;
pub mod logging;
pub mod normalize;
pub mod report;
pub mod surface;
pub mod tui;
