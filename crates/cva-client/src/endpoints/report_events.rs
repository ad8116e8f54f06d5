//! Report event endpoints
//!
//! Report events record every time a variant was tiered, proposed as a
//! candidate, reported or reviewed in an exit questionnaire.

use super::{EndpointBase, GenomicFilter, impl_endpoint_base};
use crate::pagination::Paginator;
use crate::query::QueryParams;
use crate::transport::{Endpoint, Transport};
use cva_core::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

const BASE_ENDPOINT: &str = "report-events";

/// Report event endpoints
pub struct ReportEventEndpoints {
  transport: Arc<Transport>,
}

impl_endpoint_base!(ReportEventEndpoints);

impl ReportEventEndpoints {
  /// Create a new report event endpoints instance
  pub fn new(transport: Arc<Transport>) -> Self {
    Self { transport }
  }

  /// Number of report events matching `params`
  #[instrument(skip(self, params), fields(params = %params.to_log_string()))]
  pub async fn count(&self, params: QueryParams) -> Result<u64> {
    self.transport.count(BASE_ENDPOINT, params).await
  }

  /// All report events matching `params`
  ///
  /// # Examples
  ///
  /// ```rust,no_run
  /// # use cva_client::{CvaClient, QueryParams};
  /// # use futures::TryStreamExt;
  /// # async fn run(client: CvaClient) -> cva_core::Result<()> {
  /// let mut events = client
  ///   .report_events()
  ///   .get_report_events(QueryParams::new().with("type", "reported").limit(100))
  ///   .max_results(1000)
  ///   .items();
  /// while let Some(event) = events.try_next().await? {
  ///   println!("{}", event["reportEventId"]);
  /// }
  /// # Ok(())
  /// # }
  /// ```
  pub fn get_report_events(&self, params: QueryParams) -> Paginator {
    self.paginate(BASE_ENDPOINT, params)
  }

  /// Variants with report events in the region selected by `filter`
  #[instrument(skip(self, params))]
  pub async fn get_variants_by(&self, filter: &GenomicFilter, params: QueryParams) -> Result<Vec<Value>> {
    self.fetch_all(Self::path(filter, "variants"), params).await
  }

  /// Genes with report events in the region selected by `filter`
  #[instrument(skip(self, params))]
  pub async fn get_genes_by(&self, filter: &GenomicFilter, params: QueryParams) -> Result<Vec<Value>> {
    self.fetch_all(Self::path(filter, "genes"), params).await
  }

  fn path(filter: &GenomicFilter, output: &str) -> Endpoint {
    let mut segments = vec![BASE_ENDPOINT.to_string()];
    segments.extend(filter.segments("genes", "transcripts"));
    segments.push(output.to_string());
    Endpoint::from(segments)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cva_core::Assembly;

  #[test]
  fn test_paths() {
    let filter = GenomicFilter::TranscriptId { assembly: Assembly::GRCh38, transcript_id: "ENST0001".to_string() };
    assert_eq!(
      ReportEventEndpoints::path(&filter, "variants").to_string(),
      "report-events/transcripts/GRCh38/ENST0001/variants"
    );
  }
}
