//! JSON search endpoint adapter.
//!
//! Expects `{ "<records_key>": { "<id>": { ...record... }, ... } }` (an array of
//! records is accepted too). Field names vary between records, so each output
//! field is looked up through an ordered list of alternate keys and the first
//! non-empty value wins.

use serde::Deserialize;
use serde_json::Value;

use super::{Extract, ExtractError};
use crate::models::RawCandidate;
use crate::timeparse::parse_timestamp;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRules {
    #[serde(default = "default_records_key")]
    pub records_key: String,
    pub title_keys: Vec<String>,
    pub link_keys: Vec<String>,
    #[serde(default)]
    pub date_keys: Vec<String>,
    #[serde(default = "default_record_limit")]
    pub limit: usize,
}

fn default_records_key() -> String {
    "documents".to_string()
}

fn default_record_limit() -> usize {
    60
}

pub struct SearchApiAdapter {
    label: String,
    rules: ApiRules,
}

impl SearchApiAdapter {
    pub fn new(label: &str, rules: &ApiRules) -> Self {
        Self {
            label: label.to_string(),
            rules: rules.clone(),
        }
    }
}

/// Text of a scalar, or of the first scalar inside an object/array
/// (some endpoints wrap strings as `{"cdata!": "..."}`).
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.values().find_map(text_of),
        Value::Array(items) => items.iter().find_map(text_of),
        Value::Null | Value::Bool(_) => None,
    }
}

fn first_text(record: &serde_json::Map<String, Value>, keys: &[String]) -> Option<String> {
    keys.iter()
        .filter_map(|k| record.get(k))
        .filter_map(text_of)
        .find(|s| !s.trim().is_empty())
}

impl Extract for SearchApiAdapter {
    fn extract(&self, payload: &str) -> Result<Vec<RawCandidate>, ExtractError> {
        let doc: Value = serde_json::from_str(payload)?;
        let records: Vec<&Value> = match doc.get(&self.rules.records_key) {
            Some(Value::Object(map)) => map.values().collect(),
            Some(Value::Array(items)) => items.iter().collect(),
            _ => {
                return Err(ExtractError::Shape(format!(
                    "no `{}` map in response",
                    self.rules.records_key
                )));
            }
        };

        Ok(records
            .into_iter()
            .filter_map(Value::as_object)
            .take(self.rules.limit)
            .map(|record| {
                let published = first_text(record, &self.rules.date_keys)
                    .as_deref()
                    .and_then(parse_timestamp);
                RawCandidate::new(
                    first_text(record, &self.rules.title_keys).unwrap_or_default(),
                    self.label.as_str(),
                    first_text(record, &self.rules.link_keys).unwrap_or_default(),
                    published,
                )
            })
            .collect())
    }
}
