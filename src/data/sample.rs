//! Simulated metric payloads.
//!
//! Produces array-shaped documents: seven yearly records (`2001`..`2007`),
//! each carrying a `value` and the five channel fields, all drawn uniformly
//! from `[0, 1000)`. Every record fits both series modes, so switching mode
//! never needs a new fetch.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::prelude::*;
use rand::rngs::StdRng;
use serde_json::{Map, Value};

use crate::data::DataSource;
use crate::domain::{Channel, MetricSelection, VALUE_CHANNEL};
use crate::error::FetchError;

const FIRST_YEAR: u32 = 2001;
const RECORD_COUNT: u32 = 7;
const VALUE_MAX: f64 = 1000.0;

pub struct SampleSource {
    seed: u64,
    latency: Duration,
    /// Bumped on every fetch so repeated fetches of one selection differ.
    calls: AtomicU64,
}

impl SampleSource {
    pub fn new(seed: u64, latency: Duration) -> Self {
        Self {
            seed,
            latency,
            calls: AtomicU64::new(0),
        }
    }
}

impl DataSource for SampleSource {
    fn fetch(&self, selection: MetricSelection) -> Result<Value, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        Ok(generate_payload(sample_seed(self.seed, selection, call)))
    }

    fn describe(&self) -> String {
        format!("sample seed={}", self.seed)
    }
}

/// Generate one payload document for the given seed.
pub fn generate_payload(seed: u64) -> Value {
    let mut rng = StdRng::seed_from_u64(seed);
    let records = (0..RECORD_COUNT)
        .map(|i| {
            let mut record = Map::new();
            record.insert("date".into(), Value::from((FIRST_YEAR + i).to_string()));
            record.insert(VALUE_CHANNEL.into(), Value::from(rng.gen_range(0.0..VALUE_MAX)));
            for channel in Channel::ALL {
                record.insert(channel.key().into(), Value::from(rng.gen_range(0.0..VALUE_MAX)));
            }
            Value::Object(record)
        })
        .collect();
    Value::Array(records)
}

fn sample_seed(seed: u64, selection: MetricSelection, call: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    selection.hash(&mut hasher);
    call.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawPayload;
    use crate::domain::{Device, Metric, SeriesMode};
    use crate::normalize::normalize;

    #[test]
    fn payload_has_seven_records_with_all_fields() {
        let payload = generate_payload(7);
        let records = payload.as_array().unwrap();
        assert_eq!(records.len(), 7);
        assert_eq!(records[0]["date"], "2001");
        assert_eq!(records[6]["date"], "2007");
        for record in records {
            let keys = Channel::ALL.iter().map(|c| c.key()).chain([VALUE_CHANNEL]);
            for key in keys {
                let v = record[key].as_f64().unwrap();
                assert!((0.0..VALUE_MAX).contains(&v), "{key} out of range: {v}");
            }
        }
    }

    #[test]
    fn payload_normalizes_in_both_modes() {
        let raw = RawPayload::parse(generate_payload(3));
        let single = normalize(&raw, SeriesMode::Single);
        let multi = normalize(&raw, SeriesMode::Multi);
        assert_eq!(single.len(), 7);
        assert_eq!(multi.len(), 7);
        assert!(multi.points()[0].value("Search Engine") > 0.0);
    }

    #[test]
    fn same_seed_same_payload() {
        assert_eq!(generate_payload(42), generate_payload(42));
    }

    #[test]
    fn repeated_fetches_differ() {
        let source = SampleSource::new(1, Duration::ZERO);
        let sel = MetricSelection::new(Metric::Lcp, Device::Mobile);
        let a = source.fetch(sel).unwrap();
        let b = source.fetch(sel).unwrap();
        assert_ne!(a, b);
    }
}
