//! Shared "fetch pipeline" logic used by the one-shot commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> shape check -> normalize -> chart spec
//!
//! The TUI drives the same components incrementally from its event loop.

use std::sync::Arc;

use crate::chart::{ChartSpec, build};
use crate::data::{DataSource, source_from_config};
use crate::domain::{MetricSelection, NormalizedSeries, ReportConfig, SeriesMode};
use crate::error::AppError;
use crate::fetch::{FetchController, FetchWorker};

/// All computed outputs of a single fetch cycle.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub selection: MetricSelection,
    pub mode: SeriesMode,
    pub source: String,
    pub series: NormalizedSeries,
    /// `None` when the series is empty.
    pub spec: Option<ChartSpec>,
}

/// Fetch once from the configured source.
pub fn run_once(config: &ReportConfig) -> Result<RunOutput, AppError> {
    let source = source_from_config(config)?;
    run_with_source(config, source)
}

/// Fetch once from an explicit source.
pub fn run_with_source(config: &ReportConfig, source: Arc<dyn DataSource>) -> Result<RunOutput, AppError> {
    let worker = FetchWorker::new(source);
    let mut controller = FetchController::new();

    let ticket = controller.begin(config.selection);
    let (ticket, result) = worker.fetch_blocking(ticket);
    controller.resolve(ticket, result);

    let view = controller.view(config.mode);
    if let Some(message) = view.error {
        return Err(AppError::new(4, message));
    }
    let series = view.series.unwrap_or_default();
    let spec = (!series.is_empty())
        .then(|| build(&series, config.selection.metric, config.selection.device, config.mode));

    Ok(RunOutput {
        selection: config.selection,
        mode: config.mode,
        source: worker.source().describe(),
        series,
        spec,
    })
}
