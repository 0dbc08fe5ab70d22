//! Fetch lifecycle for a (metric, device) selection.
//!
//! The controller is owned by the UI loop. Every `begin` opens a new
//! generation and moves the state to `Loading` before any retrieval work is
//! started; `resolve` applies a result only if it belongs to the current
//! generation. There is no cancellation: stale results are simply dropped.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::data::RawPayload;
use crate::data::payload::json_type_name;
use crate::domain::{MetricSelection, NormalizedSeries, SeriesMode};
use crate::error::FetchError;
use crate::normalize::normalize;

pub mod worker;

pub use worker::FetchWorker;

/// Identifies one fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub selection: MetricSelection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Loading,
    Success(RawPayload),
    Error(String),
}

/// What the selection host needs for one render cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct HostView {
    pub loading: bool,
    pub error: Option<String>,
    /// Present only when neither loading nor failed.
    pub series: Option<NormalizedSeries>,
}

#[derive(Debug)]
pub struct FetchController {
    generation: u64,
    selection: Option<MetricSelection>,
    state: FetchState,
}

impl Default for FetchController {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchController {
    pub fn new() -> Self {
        Self {
            generation: 0,
            selection: None,
            state: FetchState::Loading,
        }
    }

    /// Start a new fetch cycle. The returned ticket must accompany the result.
    pub fn begin(&mut self, selection: MetricSelection) -> FetchTicket {
        self.generation += 1;
        self.selection = Some(selection);
        self.state = FetchState::Loading;
        info!(generation = self.generation, %selection, "fetch started");
        FetchTicket {
            generation: self.generation,
            selection,
        }
    }

    /// Apply a retrieval result. Returns `false` when the ticket is stale and
    /// the result was ignored.
    pub fn resolve(&mut self, ticket: FetchTicket, result: Result<Value, FetchError>) -> bool {
        if !self.is_current(ticket) {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                selection = %ticket.selection,
                "ignoring stale fetch result"
            );
            return false;
        }

        self.state = match result.and_then(validate_shape) {
            Ok(payload) => {
                info!(
                    generation = ticket.generation,
                    shape = payload.shape_name(),
                    len = payload.len(),
                    "fetch succeeded"
                );
                FetchState::Success(payload)
            }
            Err(err) => {
                warn!(generation = ticket.generation, error = %err, "fetch failed");
                FetchState::Error(err.user_message().to_string())
            }
        };
        true
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.generation && self.selection == Some(ticket.selection)
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selection(&self) -> Option<MetricSelection> {
        self.selection
    }

    pub fn view(&self, mode: SeriesMode) -> HostView {
        match &self.state {
            FetchState::Loading => HostView {
                loading: true,
                error: None,
                series: None,
            },
            FetchState::Error(message) => HostView {
                loading: false,
                error: Some(message.clone()),
                series: None,
            },
            FetchState::Success(payload) => HostView {
                loading: false,
                error: None,
                series: Some(normalize(payload, mode)),
            },
        }
    }
}

fn validate_shape(value: Value) -> Result<RawPayload, FetchError> {
    let kind = json_type_name(&value);
    let payload = RawPayload::parse(value);
    if payload.is_recognized() {
        Ok(payload)
    } else {
        Err(FetchError::Shape(format!("expected array or object, got {kind}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Device, Metric};
    use crate::error::{FETCH_FAILED_MESSAGE, INVALID_FORMAT_MESSAGE};
    use serde_json::json;

    fn lcp_mobile() -> MetricSelection {
        MetricSelection::new(Metric::Lcp, Device::Mobile)
    }

    fn cls_desktop() -> MetricSelection {
        MetricSelection::new(Metric::Cls, Device::Desktop)
    }

    #[test]
    fn begin_enters_loading_and_bumps_generation() {
        let mut ctl = FetchController::new();
        let t1 = ctl.begin(lcp_mobile());
        assert!(ctl.resolve(t1, Ok(json!([]))));
        assert!(matches!(ctl.state(), FetchState::Success(_)));

        let t2 = ctl.begin(cls_desktop());
        assert_eq!(ctl.state(), &FetchState::Loading);
        assert!(t2.generation > t1.generation);
        assert!(ctl.view(SeriesMode::Single).loading);
    }

    #[test]
    fn older_result_arriving_late_is_ignored() {
        let mut ctl = FetchController::new();
        let g1 = ctl.begin(lcp_mobile());
        let g2 = ctl.begin(cls_desktop());

        assert!(ctl.resolve(g2, Ok(json!({"2001": 0.1}))));
        assert!(!ctl.resolve(g1, Ok(json!({"2001": 99.0, "2002": 98.0}))));

        let view = ctl.view(SeriesMode::Single);
        let series = view.series.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].value("value"), 0.1);
    }

    #[test]
    fn stale_error_does_not_replace_newer_loading() {
        let mut ctl = FetchController::new();
        let g1 = ctl.begin(lcp_mobile());
        let _g2 = ctl.begin(cls_desktop());
        assert!(!ctl.resolve(g1, Err(FetchError::Transport("boom".into()))));
        assert_eq!(ctl.state(), &FetchState::Loading);
    }

    #[test]
    fn refresh_of_same_selection_is_a_new_generation() {
        let mut ctl = FetchController::new();
        let g1 = ctl.begin(lcp_mobile());
        let g2 = ctl.begin(lcp_mobile());
        assert!(!ctl.resolve(g1, Ok(json!([]))));
        assert!(ctl.resolve(g2, Ok(json!([]))));
    }

    #[test]
    fn transport_failure_clears_previous_data() {
        let mut ctl = FetchController::new();
        let t1 = ctl.begin(lcp_mobile());
        ctl.resolve(t1, Ok(json!([{"date": "2001", "value": 1}])));
        assert!(ctl.view(SeriesMode::Single).series.is_some());

        let t2 = ctl.begin(lcp_mobile());
        ctl.resolve(t2, Err(FetchError::Transport("connection reset".into())));

        let view = ctl.view(SeriesMode::Single);
        assert!(!view.loading);
        assert_eq!(view.error.as_deref(), Some(FETCH_FAILED_MESSAGE));
        assert!(view.series.is_none());
    }

    #[test]
    fn scalar_payload_is_a_shape_error() {
        for body in [json!(null), json!(12), json!("ok")] {
            let mut ctl = FetchController::new();
            let t = ctl.begin(lcp_mobile());
            assert!(ctl.resolve(t, Ok(body)));
            assert_eq!(ctl.state(), &FetchState::Error(INVALID_FORMAT_MESSAGE.to_string()));
        }
    }

    #[test]
    fn empty_payload_is_success_with_empty_series() {
        let mut ctl = FetchController::new();
        let t = ctl.begin(lcp_mobile());
        ctl.resolve(t, Ok(json!({})));
        let view = ctl.view(SeriesMode::Single);
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert!(view.series.unwrap().is_empty());
    }

    #[test]
    fn view_normalizes_with_requested_mode() {
        let mut ctl = FetchController::new();
        let t = ctl.begin(lcp_mobile());
        ctl.resolve(t, Ok(json!([{"date": "2001", "Email": 2}])));
        let multi = ctl.view(SeriesMode::Multi).series.unwrap();
        assert_eq!(multi.points()[0].value("Email"), 2.0);
        let single = ctl.view(SeriesMode::Single).series.unwrap();
        assert_eq!(single.points()[0].value("value"), 0.0);
    }
}
