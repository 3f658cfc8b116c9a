use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable row key of a collection record (`id`, `visitorId`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Int(i64),
    Text(String),
}

impl Identity {
    /// Reads an identity out of a JSON value. Only integers and non-empty
    /// strings qualify.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Identity::Int),
            Value::String(s) if !s.trim().is_empty() => Some(Identity::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Identity::Int(n) => Value::from(*n),
            Identity::Text(s) => Value::from(s.clone()),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Int(n) => write!(f, "{}", n),
            Identity::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Identity {
    fn from(value: i64) -> Self {
        Identity::Int(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Identity::Text(value.to_string())
    }
}

/// One row of a REST collection: an opaque field-name to value mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builds a record from a JSON value; anything but an object is rejected.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn identity(&self, identity_field: &str) -> Option<Identity> {
        self.fields.get(identity_field).and_then(Identity::from_json)
    }

    /// Display text of a field; `null` and missing fields render empty.
    pub fn text(&self, field: &str) -> String {
        match self.fields.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// True when the field is absent, `null`, or a whitespace-only string.
    pub fn is_blank(&self, field: &str) -> bool {
        match self.fields.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }

    pub fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        match self.fields.get(field) {
            Some(Value::String(s)) => parse_timestamp(s),
            Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.fields)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

const INPUT_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parses RFC 3339 timestamps, or `YYYY-MM-DD HH:MM` read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_from_json() {
        assert_eq!(Identity::from_json(&json!(7)), Some(Identity::Int(7)));
        assert_eq!(
            Identity::from_json(&json!("v-1")),
            Some(Identity::Text("v-1".into()))
        );
        assert_eq!(Identity::from_json(&json!("  ")), None);
        assert_eq!(Identity::from_json(&json!(null)), None);
        assert_eq!(Identity::Int(42).to_string(), "42");
    }

    #[test]
    fn test_record_text_and_blank() {
        let record = Record::from_json(json!({"id": 1, "status": "OPEN", "note": null, "pad": "  "}))
            .unwrap();

        assert_eq!(record.text("status"), "OPEN");
        assert_eq!(record.text("id"), "1");
        assert_eq!(record.text("note"), "");
        assert!(record.is_blank("note"));
        assert!(record.is_blank("pad"));
        assert!(record.is_blank("missing"));
        assert!(!record.is_blank("status"));
        assert_eq!(record.identity("id"), Some(Identity::Int(1)));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2026-10-20T14:30:00Z").unwrap();
        let plain = parse_timestamp("2026-10-20 14:30").unwrap();
        assert_eq!(rfc, plain);
        assert_eq!(format_timestamp(plain), "2026-10-20T14:30:00Z");
        assert!(parse_timestamp("tomorrow").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
