/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! The wrapper object every CVA response body is nested inside

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{time, error, warning, response: [{result: [...]}]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
  /// Server side processing time in milliseconds
  #[serde(default)]
  pub time: Option<f64>,

  /// Non-empty when the whole call failed, whatever the HTTP status
  #[serde(default)]
  pub error: Option<Value>,

  /// Advisory only
  #[serde(default)]
  pub warning: Option<Value>,

  #[serde(default)]
  pub response: Option<Vec<ResponseBlock>>,
}

/// One element of the `response` array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseBlock {
  #[serde(default)]
  pub result: Option<Value>,
}

impl ResponseEnvelope {
  /// The `error` field rendered as text, `None` when absent or empty
  pub fn error_message(&self) -> Option<String> {
    non_empty_text(self.error.as_ref())
  }

  /// The `warning` field rendered as text, `None` when absent or empty
  pub fn warning_message(&self) -> Option<String> {
    non_empty_text(self.warning.as_ref())
  }

  /// `response[0].result` as a sequence of entities.
  ///
  /// A missing response, missing result, or `null` result is an empty
  /// sequence. A scalar result (as returned for counts) becomes a one element
  /// sequence.
  pub fn into_results(self) -> Vec<Value> {
    let first = self.response.and_then(|blocks| blocks.into_iter().next());
    match first.and_then(|block| block.result) {
      Some(Value::Array(items)) => items,
      Some(Value::Null) | None => Vec::new(),
      Some(other) => vec![other],
    }
  }
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
  match value? {
    Value::Null => None,
    Value::String(s) if s.trim().is_empty() => None,
    Value::String(s) => Some(s.clone()),
    Value::Array(a) if a.is_empty() => None,
    Value::Object(o) if o.is_empty() => None,
    Value::Bool(false) => None,
    other => Some(other.to_string()),
  }
}
