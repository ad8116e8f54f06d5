//! Reshaping helpers for aggregation results keyed by `_id`

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key used by the service for aggregation buckets
pub const ID_FIELD: &str = "_id";

/// Map each result's `_id` (rendered as text) to the rest of its fields.
///
/// Results without an `_id` are skipped.
pub fn results_to_map(results: Vec<Value>) -> BTreeMap<String, Map<String, Value>> {
  results
    .into_iter()
    .filter_map(|result| match result {
      Value::Object(mut fields) => {
        let id = fields.remove(ID_FIELD)?;
        Some((id_text(id), fields))
      }
      _ => None,
    })
    .collect()
}

/// The `_id` value of every result, in order
pub fn results_to_list(results: Vec<Value>) -> Vec<Value> {
  results
    .into_iter()
    .filter_map(|result| match result {
      Value::Object(mut fields) => fields.remove(ID_FIELD),
      _ => None,
    })
    .collect()
}

fn id_text(id: Value) -> String {
  match id {
    Value::String(s) => s,
    other => other.to_string(),
  }
}
