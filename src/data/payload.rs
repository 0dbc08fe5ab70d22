//! Closed set of accepted payload shapes.
//!
//! Payloads arrive as arbitrary JSON. Parsing into `RawPayload` never fails:
//! anything that is not an array or an object becomes `Unrecognized`, and it is
//! up to the caller to decide what that means (the fetch controller treats it
//! as a shape error, the normalizer as an empty series).

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Array shape: one record per date.
    Records(Vec<Value>),
    /// Object shape: date label -> value, in document order.
    Map(Vec<(String, Value)>),
    /// Null, number, string or bool at the top level.
    Unrecognized,
}

impl RawPayload {
    pub fn parse(value: Value) -> Self {
        match value {
            Value::Array(items) => RawPayload::Records(items),
            Value::Object(map) => RawPayload::Map(map.into_iter().collect()),
            _ => RawPayload::Unrecognized,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, RawPayload::Unrecognized)
    }

    /// Number of records or keys. Zero for unrecognized payloads.
    pub fn len(&self) -> usize {
        match self {
            RawPayload::Records(items) => items.len(),
            RawPayload::Map(entries) => entries.len(),
            RawPayload::Unrecognized => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short shape name for logs.
    pub fn shape_name(&self) -> &'static str {
        match self {
            RawPayload::Records(_) => "array",
            RawPayload::Map(_) => "map",
            RawPayload::Unrecognized => "unrecognized",
        }
    }
}

/// JSON type name of a value, for log and error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arrays_and_objects_are_recognized() {
        assert!(matches!(RawPayload::parse(json!([])), RawPayload::Records(v) if v.is_empty()));
        assert!(matches!(RawPayload::parse(json!({})), RawPayload::Map(v) if v.is_empty()));
    }

    #[test]
    fn scalars_are_unrecognized() {
        for value in [json!(null), json!(3), json!("x"), json!(true)] {
            let payload = RawPayload::parse(value);
            assert_eq!(payload, RawPayload::Unrecognized);
            assert!(payload.is_empty());
        }
    }

    #[test]
    fn map_keeps_document_order() {
        let value: Value = serde_json::from_str(r#"{"2003": 1, "2001": 2, "2002": 3}"#).unwrap();
        let RawPayload::Map(entries) = RawPayload::parse(value) else {
            panic!("expected map shape");
        };
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["2003", "2001", "2002"]);
    }
}
