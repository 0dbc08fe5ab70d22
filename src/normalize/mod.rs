//! Payload normalization.
//!
//! Turns a `RawPayload` into a `NormalizedSeries`. This never fails: a
//! malformed element degrades to an empty date label and zero-valued channels
//! for that element only, and shapes that do not fit the mode degrade to an
//! empty series.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::data::RawPayload;
use crate::domain::{Channel, NormalizedPoint, NormalizedSeries, SeriesMode, VALUE_CHANNEL};

pub fn normalize(raw: &RawPayload, mode: SeriesMode) -> NormalizedSeries {
    let points = match (raw, mode) {
        (RawPayload::Records(items), SeriesMode::Single) => items
            .iter()
            .map(|item| NormalizedPoint {
                date: date_label(item),
                channels: BTreeMap::from([(VALUE_CHANNEL.to_string(), numeric(item.get(VALUE_CHANNEL)))]),
            })
            .collect(),
        (RawPayload::Records(items), SeriesMode::Multi) => items
            .iter()
            .map(|item| NormalizedPoint {
                date: date_label(item),
                channels: Channel::ALL
                    .iter()
                    .map(|c| (c.key().to_string(), numeric(item.get(c.key()))))
                    .collect(),
            })
            .collect(),
        (RawPayload::Map(entries), SeriesMode::Single) => entries
            .iter()
            .map(|(date, value)| NormalizedPoint {
                date: date.clone(),
                channels: BTreeMap::from([(VALUE_CHANNEL.to_string(), numeric(Some(value)))]),
            })
            .collect(),
        // A date -> number map cannot carry five channels.
        (RawPayload::Map(_), SeriesMode::Multi) => Vec::new(),
        (RawPayload::Unrecognized, _) => Vec::new(),
    };

    NormalizedSeries::new(points)
}

/// `date` field as a label. Absent, null or non-string dates become `""`;
/// numeric dates are kept as their JSON text.
fn date_label(item: &Value) -> String {
    match item.get("date") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Only finite JSON numbers count; everything else reads as zero.
fn numeric(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> RawPayload {
        RawPayload::parse(value)
    }

    #[test]
    fn non_numeric_value_becomes_zero() {
        let raw = parse(json!([{"date": "2001", "value": 10}, {"date": "2002", "value": "bad"}]));
        let series = normalize(&raw, SeriesMode::Single);

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].date, "2001");
        assert_eq!(series.points()[0].value(VALUE_CHANNEL), 10.0);
        assert_eq!(series.points()[1].date, "2002");
        assert_eq!(series.points()[1].value(VALUE_CHANNEL), 0.0);
        assert_eq!(series.points()[1].channels.len(), 1);
    }

    #[test]
    fn single_mode_preserves_length_and_order() {
        let raw = parse(json!([
            {"date": "c", "value": 3},
            {"date": "a", "value": 1},
            {"date": "b", "value": 2},
            {"date": "a", "value": 4}
        ]));
        let series = normalize(&raw, SeriesMode::Single);
        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, ["c", "a", "b", "a"]);
    }

    #[test]
    fn missing_date_keeps_point_with_empty_label() {
        let raw = parse(json!([{"value": 5}, {"date": null, "value": 6}, 17]));
        let series = normalize(&raw, SeriesMode::Single);
        assert_eq!(series.len(), 3);
        assert!(series.dates().all(str::is_empty));
        assert_eq!(series.points()[0].value(VALUE_CHANNEL), 5.0);
        // A record that is not an object still occupies its slot.
        assert_eq!(series.points()[2].value(VALUE_CHANNEL), 0.0);
    }

    #[test]
    fn numeric_strings_are_not_numbers() {
        let raw = parse(json!([{"date": "2001", "value": "12"}]));
        let series = normalize(&raw, SeriesMode::Single);
        assert_eq!(series.points()[0].value(VALUE_CHANNEL), 0.0);
    }

    #[test]
    fn map_shape_single_mode() {
        let raw = parse(json!({"2001": 1.5, "2002": "x", "2003": null, "2004": 4}));
        let series = normalize(&raw, SeriesMode::Single);
        assert_eq!(series.len(), 4);
        let values: Vec<_> = series.points().iter().map(|p| p.value(VALUE_CHANNEL)).collect();
        assert_eq!(values, [1.5, 0.0, 0.0, 4.0]);
        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, ["2001", "2002", "2003", "2004"]);
    }

    #[test]
    fn map_shape_is_empty_in_multi_mode() {
        let raw = parse(json!({"2001": 1}));
        assert!(normalize(&raw, SeriesMode::Multi).is_empty());
    }

    #[test]
    fn empty_inputs_give_empty_series() {
        for mode in [SeriesMode::Single, SeriesMode::Multi] {
            assert!(normalize(&parse(json!([])), mode).is_empty());
            assert!(normalize(&parse(json!({})), mode).is_empty());
        }
    }

    #[test]
    fn scalars_give_empty_series() {
        for value in [json!(42), json!("text"), json!(null), json!(false)] {
            for mode in [SeriesMode::Single, SeriesMode::Multi] {
                assert!(normalize(&parse(value.clone()), mode).is_empty());
            }
        }
    }

    #[test]
    fn missing_direct_is_zero_for_that_record_only() {
        let raw = parse(json!([
            {"date": "2001", "Email": 1, "Union Ads": 2, "Video Ads": 3, "Direct": 4, "Search Engine": 5},
            {"date": "2002", "Email": 6, "Union Ads": 7, "Video Ads": 8, "Search Engine": 10},
            {"date": "2003", "Email": 11, "Union Ads": 12, "Video Ads": 13, "Direct": 14, "Search Engine": 15}
        ]));
        let series = normalize(&raw, SeriesMode::Multi);
        let p = series.points();

        assert_eq!(p[1].value("Direct"), 0.0);
        assert_eq!(p[1].channels.len(), 5);
        assert_eq!(p[1].value("Search Engine"), 10.0);
        assert_eq!(p[0].value("Direct"), 4.0);
        assert_eq!(p[2].value("Direct"), 14.0);
        assert_eq!(p[2].value("Email"), 11.0);
    }

    #[test]
    fn multi_mode_ignores_value_field() {
        let raw = parse(json!([{"date": "2001", "value": 9}]));
        let series = normalize(&raw, SeriesMode::Multi);
        let point = &series.points()[0];
        assert!(!point.channels.contains_key(VALUE_CHANNEL));
        assert!(Channel::ALL.iter().all(|c| point.value(c.key()) == 0.0));
    }
}
