//! Variant endpoints

use super::{EndpointBase, impl_endpoint_base};
use crate::batch::fetch_by_ids;
use crate::pagination::Paginator;
use crate::query::QueryParams;
use crate::transport::{Endpoint, Transport};
use cva_core::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, warn};

const BASE_ENDPOINT: &str = "variants";

/// Variant endpoints
pub struct VariantEndpoints {
  transport: Arc<Transport>,
  concurrency: usize,
}

impl_endpoint_base!(VariantEndpoints);

impl VariantEndpoints {
  /// Create a new variant endpoints instance; `concurrency` bounds by-id fetches
  pub fn new(transport: Arc<Transport>, concurrency: usize) -> Self {
    Self { transport, concurrency }
  }

  /// Number of variants matching `params`
  #[instrument(skip(self, params), fields(params = %params.to_log_string()))]
  pub async fn count(&self, params: QueryParams) -> Result<u64> {
    self.transport.count(BASE_ENDPOINT, params).await
  }

  /// All variants matching `params`
  pub fn get_variants(&self, params: QueryParams) -> Paginator {
    self.paginate(BASE_ENDPOINT, params)
  }

  /// One variant by its `assembly:chromosome:position:ref:alt` identifier
  #[instrument(skip(self))]
  pub async fn get_variant_by_id(&self, identifier: &str) -> Result<Option<Value>> {
    let variant = self.fetch_one(Endpoint::from(BASE_ENDPOINT).join(identifier), QueryParams::new()).await?;
    if variant.is_none() {
      warn!("No variant found with id {}", identifier);
    }
    Ok(variant)
  }

  /// Several variants fetched in parallel, in the order of `identifiers`
  #[instrument(skip(self, identifiers), fields(identifiers = identifiers.len(), concurrency = self.concurrency))]
  pub async fn get_variants_by_ids<S: AsRef<str>>(&self, identifiers: &[S]) -> Result<Vec<Option<Value>>> {
    fetch_by_ids(&self.transport, BASE_ENDPOINT, identifiers, self.concurrency).await
  }
}
