//! Typed query parameters
//!
//! Every call gets its own [`QueryParams`]. List values are sent as repeated
//! `key=value` pairs, never with array syntax.

use cva_core::{COUNT_PARAM, Error, INCLUDE_PARAM, LIMIT_PARAM, MARKER_PARAM, Result};
use cva_models::Cursor;

/// Value of one query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
  /// Sent once
  Scalar(String),
  /// Sent once per element under the same key
  List(Vec<String>),
}

/// Ordered mapping of parameter name to value.
///
/// Setting a key that is already present replaces its value in place, so the
/// original ordering is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
  entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
  /// Empty parameter set
  pub fn new() -> Self {
    Self::default()
  }

  /// Page size
  pub fn limit(mut self, limit: u32) -> Self {
    self.set(LIMIT_PARAM, ParamValue::Scalar(limit.to_string()));
    self
  }

  /// Opaque cursor position
  pub fn marker(mut self, marker: impl Into<String>) -> Self {
    self.set(MARKER_PARAM, ParamValue::Scalar(marker.into()));
    self
  }

  /// Ask for a scalar count instead of a page of entities
  pub fn count(mut self, count: bool) -> Self {
    self.set(COUNT_PARAM, ParamValue::Scalar(count.to_string()));
    self
  }

  /// Field selectors
  pub fn include<I, S>(mut self, fields: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.set(INCLUDE_PARAM, ParamValue::List(fields.into_iter().map(Into::into).collect()));
    self
  }

  /// Free-form scalar filter
  pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
    self.set(key, ParamValue::Scalar(value.to_string()));
    self
  }

  /// Free-form list filter
  pub fn with_list<I, S>(mut self, key: impl Into<String>, values: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: ToString,
  {
    self.set(key, ParamValue::List(values.into_iter().map(|v| v.to_string()).collect()));
    self
  }

  /// Insert or replace a parameter
  pub fn set(&mut self, key: impl Into<String>, value: ParamValue) {
    let key = key.into();
    match self.entries.iter_mut().find(|(k, _)| *k == key) {
      Some((_, existing)) => *existing = value,
      None => self.entries.push((key, value)),
    }
  }

  /// Value of a parameter
  pub fn get(&self, key: &str) -> Option<&ParamValue> {
    self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
  }

  /// Remove a parameter, returning its value
  pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
    let idx = self.entries.iter().position(|(k, _)| k == key)?;
    Some(self.entries.remove(idx).1)
  }

  /// Copy every parameter of `other` over this set
  pub fn merge(&mut self, other: &QueryParams) {
    for (key, value) in &other.entries {
      self.set(key.clone(), value.clone());
    }
  }

  /// Feed a response cursor back as the next request's `limit`/`marker`
  pub fn apply_cursor(&mut self, cursor: &Cursor) {
    if let Some(limit) = &cursor.limit {
      self.set(LIMIT_PARAM, ParamValue::Scalar(limit.clone()));
    }
    self.set(MARKER_PARAM, ParamValue::Scalar(cursor.marker.clone()));
  }

  /// Whether `count=true` is set
  pub fn is_count(&self) -> bool {
    matches!(self.get(COUNT_PARAM), Some(ParamValue::Scalar(v)) if v.eq_ignore_ascii_case("true"))
  }

  /// Number of parameters
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether no parameter is set
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Check the recognized keys hold sensible values
  pub fn validate(&self) -> Result<()> {
    for (key, value) in &self.entries {
      match (key.as_str(), value) {
        (LIMIT_PARAM, ParamValue::Scalar(v)) => match v.parse::<u32>() {
          Ok(n) if n > 0 => {}
          _ => {
            return Err(Error::InvalidParameter(format!(
              "'{}' must be a positive integer, got '{}'",
              LIMIT_PARAM, v
            )));
          }
        },
        (COUNT_PARAM, ParamValue::Scalar(v)) => {
          if !v.eq_ignore_ascii_case("true") && !v.eq_ignore_ascii_case("false") {
            return Err(Error::InvalidParameter(format!(
              "'{}' must be a boolean, got '{}'",
              COUNT_PARAM, v
            )));
          }
        }
        (MARKER_PARAM, ParamValue::Scalar(v)) if v.is_empty() => {
          return Err(Error::InvalidParameter(format!("'{}' must not be empty", MARKER_PARAM)));
        }
        (LIMIT_PARAM | COUNT_PARAM | MARKER_PARAM, ParamValue::List(_)) => {
          return Err(Error::InvalidParameter(format!("'{}' cannot be a list", key)));
        }
        _ => {}
      }
    }
    Ok(())
  }

  /// Flattened `(key, value)` pairs, lists expanded to repeated keys
  pub fn to_pairs(&self) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(self.entries.len());
    for (key, value) in &self.entries {
      match value {
        ParamValue::Scalar(v) => pairs.push((key.clone(), v.clone())),
        ParamValue::List(values) => {
          pairs.extend(values.iter().map(|v| (key.clone(), v.clone())));
        }
      }
    }
    pairs
  }

  /// Human readable `k=v&k=v` rendering used in request log lines
  pub fn to_log_string(&self) -> String {
    self.to_pairs().iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>().join("&")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_lists_expand_to_repeated_keys() {
    let params = QueryParams::new()
      .with("program", "rare_disease")
      .with_list("hpoIds", ["HP:0000001", "HP:0000002"])
      .include(["_id", "variant"]);

    assert_eq!(
      params.to_pairs(),
      vec![
        ("program".to_string(), "rare_disease".to_string()),
        ("hpoIds".to_string(), "HP:0000001".to_string()),
        ("hpoIds".to_string(), "HP:0000002".to_string()),
        ("include".to_string(), "_id".to_string()),
        ("include".to_string(), "variant".to_string()),
      ]
    );
    assert_eq!(
      params.to_log_string(),
      "program=rare_disease&hpoIds=HP:0000001&hpoIds=HP:0000002&include=_id&include=variant"
    );
  }

  #[test]
  fn test_set_replaces_in_place() {
    let mut params = QueryParams::new().limit(10).with("a", 1);
    params.set("limit", ParamValue::Scalar("20".to_string()));
    assert_eq!(params.len(), 2);
    assert_eq!(params.to_pairs()[0], ("limit".to_string(), "20".to_string()));
  }

  #[test]
  fn test_apply_cursor() {
    let mut params = QueryParams::new().limit(2).with("assembly", "GRCh38");
    params.apply_cursor(&Cursor { limit: Some("2".to_string()), marker: "m-1".to_string() });
    assert_eq!(params.get("marker"), Some(&ParamValue::Scalar("m-1".to_string())));

    params.apply_cursor(&Cursor { limit: None, marker: "m-2".to_string() });
    assert_eq!(params.get("limit"), Some(&ParamValue::Scalar("2".to_string())));
    assert_eq!(params.get("marker"), Some(&ParamValue::Scalar("m-2".to_string())));
  }

  #[test]
  fn test_count_flag() {
    assert!(QueryParams::new().count(true).is_count());
    assert!(!QueryParams::new().count(false).is_count());
    assert!(!QueryParams::new().is_count());
  }

  #[test]
  fn test_validate_recognized_keys() {
    assert!(QueryParams::new().limit(5).count(true).validate().is_ok());
    assert!(QueryParams::new().with("limit", "0").validate().is_err());
    assert!(QueryParams::new().with("limit", "many").validate().is_err());
    assert!(QueryParams::new().with("count", "yes").validate().is_err());
    assert!(QueryParams::new().with("marker", "").validate().is_err());
    assert!(QueryParams::new().with_list("limit", [1, 2]).validate().is_err());
    assert!(QueryParams::new().with("gene", "BRCA1").validate().is_ok());
  }

  #[test]
  fn test_remove_and_merge() {
    let mut params = QueryParams::new().count(true).with("x", 1);
    assert!(params.remove("count").is_some());
    assert!(!params.is_count());

    params.merge(&QueryParams::new().with("x", 2).with("y", 3));
    assert_eq!(params.to_log_string(), "x=2&y=3");
  }
}
