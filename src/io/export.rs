//! Export a chart spec to JSON.
//!
//! The exported document wraps the ECharts-compatible option object with the
//! context it was built from, so a saved file is self-describing.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chart::ChartSpec;
use crate::domain::{MetricSelection, SeriesMode};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct SpecExport {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub selection: MetricSelection,
    pub mode: SeriesMode,
    pub source: String,
    /// `None` when the series was empty and nothing would be charted.
    pub option: Option<ChartSpec>,
}

impl SpecExport {
    pub fn new(selection: MetricSelection, mode: SeriesMode, source: String, option: Option<ChartSpec>) -> Self {
        Self {
            tool: "perf-report".to_string(),
            generated_at: Utc::now(),
            selection,
            mode,
            source,
            option,
        }
    }
}

pub fn spec_json_string(export: &SpecExport) -> Result<String, AppError> {
    serde_json::to_string_pretty(export)
        .map_err(|e| AppError::new(4, format!("Failed to serialize chart spec: {e}")))
}

/// Write a spec JSON file.
pub fn write_spec_json(path: &Path, export: &SpecExport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create spec JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, export)
        .map_err(|e| AppError::new(2, format!("Failed to write spec JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::build;
    use crate::data::RawPayload;
    use crate::domain::{Device, Metric};
    use crate::normalize::normalize;
    use serde_json::{Value, json};

    #[test]
    fn export_wraps_option_with_context() {
        let sel = MetricSelection::new(Metric::Lcp, Device::Desktop);
        let series = normalize(&RawPayload::parse(json!({"2001": 2.0})), SeriesMode::Single);
        let spec = build(&series, sel.metric, sel.device, SeriesMode::Single);
        let export = SpecExport::new(sel, SeriesMode::Single, "sample seed=1".into(), Some(spec));

        let doc: Value = serde_json::from_str(&spec_json_string(&export).unwrap()).unwrap();
        assert_eq!(doc["tool"], "perf-report");
        assert_eq!(doc["selection"]["metric"], "LCP");
        assert_eq!(doc["selection"]["device"], "Desktop");
        assert_eq!(doc["mode"], "single");
        assert_eq!(doc["option"]["series"][0]["data"][0], 2.0);
        assert!(doc["generated_at"].is_string());
    }

    #[test]
    fn written_file_round_trips_as_json() {
        let path = std::env::temp_dir().join(format!("perf-report-export-{}.json", std::process::id()));
        let sel = MetricSelection::new(Metric::Cls, Device::Mobile);
        let export = SpecExport::new(sel, SeriesMode::Multi, "sample".into(), None);

        write_spec_json(&path, &export).unwrap();
        let doc: Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(doc["option"].is_null());
        assert_eq!(doc["mode"], "multi");
    }
}
