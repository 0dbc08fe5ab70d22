//! Payload sources.
//!
//! A `DataSource` turns a selection into a raw JSON document. Sources block;
//! the fetch worker runs them off the UI loop.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{MetricSelection, ReportConfig, SourceKind};
use crate::error::{AppError, FetchError};

pub mod http;
pub mod payload;
pub mod sample;

pub use http::HttpSource;
pub use payload::RawPayload;
pub use sample::SampleSource;

pub trait DataSource: Send + Sync {
    /// Retrieve the payload for one selection.
    fn fetch(&self, selection: MetricSelection) -> Result<Value, FetchError>;

    /// One-line description for the UI header and logs.
    fn describe(&self) -> String;
}

/// Build the source named by the config.
pub fn source_from_config(config: &ReportConfig) -> Result<Arc<dyn DataSource>, AppError> {
    match config.source {
        SourceKind::Sample => Ok(Arc::new(SampleSource::new(config.seed, config.sample_latency))),
        SourceKind::Http => {
            let endpoint = config.endpoint.clone().ok_or_else(|| {
                AppError::new(
                    2,
                    "Missing endpoint: pass --endpoint or set PERF_REPORT_ENDPOINT (.env).",
                )
            })?;
            Ok(Arc::new(HttpSource::new(endpoint, config.timeout)?))
        }
    }
}
