//! Pagination cursor returned in response headers

use serde::{Deserialize, Serialize};

/// A `(limit, marker)` pair pointing at the next page.
///
/// Both values are opaque and are sent back exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
  /// Page size the server used, if it reported one
  pub limit: Option<String>,
  /// Position to resume from
  pub marker: String,
}

impl Cursor {
  /// Build a cursor from the raw `X-Pagination-Limit` and
  /// `X-Pagination-Marker` header values.
  ///
  /// Without a non-empty marker there is no next page.
  pub fn from_header_values(limit: Option<&str>, marker: Option<&str>) -> Option<Self> {
    let marker = marker.filter(|m| !m.is_empty())?;
    Some(Cursor {
      limit: limit.filter(|l| !l.is_empty()).map(str::to_string),
      marker: marker.to_string(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_marker_required() {
    assert_eq!(Cursor::from_header_values(Some("50"), None), None);
    assert_eq!(Cursor::from_header_values(Some("50"), Some("")), None);
  }

  #[test]
  fn test_values_kept_verbatim() {
    let cursor = Cursor::from_header_values(Some("2"), Some("5c8f%2Fabc")).unwrap();
    assert_eq!(cursor.limit.as_deref(), Some("2"));
    assert_eq!(cursor.marker, "5c8f%2Fabc");

    let cursor = Cursor::from_header_values(None, Some("m1")).unwrap();
    assert_eq!(cursor.limit, None);
  }
}
