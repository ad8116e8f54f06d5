//! Transaction endpoints
//!
//! Every data intake call is recorded as a transaction; failed ones can be
//! retried server side.

use super::{EndpointBase, impl_endpoint_base};
use crate::pagination::Paginator;
use crate::query::QueryParams;
use crate::transport::{Endpoint, Transport};
use cva_core::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

const BASE_ENDPOINT: &str = "transactions";

/// Transaction endpoints
pub struct TransactionEndpoints {
  transport: Arc<Transport>,
}

impl_endpoint_base!(TransactionEndpoints);

impl TransactionEndpoints {
  /// Create a new transaction endpoints instance
  pub fn new(transport: Arc<Transport>) -> Self {
    Self { transport }
  }

  /// A transaction by identifier
  #[instrument(skip(self))]
  pub async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Value>> {
    self.fetch_one(Endpoint::from(BASE_ENDPOINT).join(transaction_id), QueryParams::new()).await
  }

  /// All transactions matching `params` (e.g. `status=ERROR`)
  pub fn get_transactions(&self, params: QueryParams) -> Paginator {
    self.paginate(BASE_ENDPOINT, params)
  }

  /// Number of transactions matching `params`
  #[instrument(skip(self, params), fields(params = %params.to_log_string()))]
  pub async fn count(&self, params: QueryParams) -> Result<u64> {
    self.transport.count(BASE_ENDPOINT, params).await
  }

  /// Ask the service to process a failed transaction again
  #[instrument(skip(self))]
  pub async fn retry_transaction(&self, transaction_id: &str) -> Result<Option<Value>> {
    info!("Retrying transaction {}", transaction_id);
    let response =
      self.transport.patch(Endpoint::from(BASE_ENDPOINT).join(transaction_id), QueryParams::new()).await?;
    Ok(response.results.into_iter().next())
  }
}
