//! Pedigree endpoints

use super::{EndpointBase, impl_endpoint_base};
use crate::query::QueryParams;
use crate::transport::{Endpoint, Transport};
use cva_core::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, warn};

const BASE_ENDPOINT: &str = "pedigrees";

/// Pedigree endpoints
pub struct PedigreeEndpoints {
  transport: Arc<Transport>,
}

impl_endpoint_base!(PedigreeEndpoints);

impl PedigreeEndpoints {
  /// Create a new pedigree endpoints instance
  pub fn new(transport: Arc<Transport>) -> Self {
    Self { transport }
  }

  /// A pedigree by identifier and version
  #[instrument(skip(self))]
  pub async fn get_pedigree(&self, identifier: &str, version: u32) -> Result<Option<Value>> {
    let endpoint = Endpoint::from(BASE_ENDPOINT).join(identifier).join(version);
    let pedigree = self.fetch_one(endpoint, QueryParams::new()).await?;
    if pedigree.is_none() {
      warn!("No pedigree found with id-version {}-{}", identifier, version);
    }
    Ok(pedigree)
  }
}
