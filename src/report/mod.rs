//! Reporting utilities for one-shot commands.

pub mod format;

pub use format::{format_run_summary, format_series_table};
