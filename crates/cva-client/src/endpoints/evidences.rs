//! Evidence endpoints

use super::{EndpointBase, impl_endpoint_base};
use crate::pagination::Paginator;
use crate::query::QueryParams;
use crate::transport::{Endpoint, Transport};
use std::sync::Arc;

const BASE_ENDPOINT: &str = "evidences";

/// Evidence endpoints
pub struct EvidenceEndpoints {
  transport: Arc<Transport>,
}

impl_endpoint_base!(EvidenceEndpoints);

impl EvidenceEndpoints {
  /// Create a new evidence endpoints instance
  pub fn new(transport: Arc<Transport>) -> Self {
    Self { transport }
  }

  /// All evidences loaded from `source` (e.g. `clinvar`)
  pub fn get_evidences(&self, source: &str, params: QueryParams) -> Paginator {
    self.paginate(Endpoint::from(BASE_ENDPOINT).join(source), params)
  }
}
