//! Endpoint groups of the CVA API
//!
//! Every group holds a shared [`Transport`] and builds its paths below one
//! base endpoint. Listings are returned as [`Paginator`]s, single entities as
//! `Option<Value>` (`None` when the service has nothing).

pub mod cases;
pub mod data_intake;
pub mod entities;
pub mod evidences;
pub mod lift_overs;
pub mod pedigrees;
pub mod report_events;
pub mod transactions;
pub mod variants;

use crate::pagination::Paginator;
use crate::query::QueryParams;
use crate::transport::{Endpoint, Transport};
use cva_core::{Assembly, Error, INCLUDE_AGGREGATIONS_PARAM, Result};
use cva_models::{results_to_list, results_to_map};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of an aggregation query
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
  /// The `_id` of every bucket, in service order
  Ids(Vec<Value>),
  /// Bucket fields keyed by the bucket `_id`
  Buckets(BTreeMap<String, Map<String, Value>>),
}

impl Aggregation {
  /// Reshape raw aggregation results
  pub fn from_results(results: Vec<Value>, include_aggregations: bool) -> Self {
    if include_aggregations {
      Aggregation::Buckets(results_to_map(results))
    } else {
      Aggregation::Ids(results_to_list(results))
    }
  }

  /// Number of buckets
  pub fn len(&self) -> usize {
    match self {
      Aggregation::Ids(ids) => ids.len(),
      Aggregation::Buckets(buckets) => buckets.len(),
    }
  }

  /// Whether the aggregation matched nothing
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Base trait for endpoint implementations
///
/// Provides common functionality needed by all endpoint modules
pub trait EndpointBase {
  /// Get a reference to the transport layer
  fn transport(&self) -> &Arc<Transport>;

  /// Paginated listing of `endpoint`
  fn paginate<T>(&self, endpoint: impl Into<Endpoint>, params: QueryParams) -> Paginator<T>
  where
    T: DeserializeOwned + Send + 'static,
  {
    Paginator::new(Arc::clone(self.transport()), endpoint, params)
  }

  /// Fetch a single entity, `None` when the service returns nothing
  async fn fetch_one(&self, endpoint: impl Into<Endpoint>, params: QueryParams) -> Result<Option<Value>> {
    let endpoint = endpoint.into();
    let mut results = self.transport().get(&endpoint, params).await?.results;
    match results.len() {
      0 => Ok(None),
      1 => Ok(results.pop()),
      n => Err(Error::Parse(format!("Expected a single result from {}, got {}", endpoint, n))),
    }
  }

  /// All results of a non-paginated call
  async fn fetch_all(&self, endpoint: impl Into<Endpoint>, params: QueryParams) -> Result<Vec<Value>> {
    Ok(self.transport().get(endpoint, params).await?.results)
  }

  /// Aggregation query on `endpoint`.
  ///
  /// With `include_aggregations` the buckets are keyed by their `_id`,
  /// otherwise only the `_id` of each bucket is kept.
  async fn aggregation(
    &self,
    endpoint: impl Into<Endpoint>,
    include_aggregations: bool,
    params: QueryParams,
  ) -> Result<Aggregation> {
    let params = params.with(INCLUDE_AGGREGATIONS_PARAM, include_aggregations);
    let results = self.fetch_all(endpoint, params).await?;
    Ok(Aggregation::from_results(results, include_aggregations))
  }
}

/// Macro to implement the EndpointBase trait for endpoint structs
macro_rules! impl_endpoint_base {
  ($struct_name:ident) => {
    impl EndpointBase for $struct_name {
      fn transport(&self) -> &Arc<Transport> {
        &self.transport
      }
    }
  };
}

pub(crate) use impl_endpoint_base;

/// Region a query is restricted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenomicFilter {
  /// A single gene
  GeneId {
    /// Reference genome of the id
    assembly: Assembly,
    /// Ensembl gene id
    gene_id: String,
  },
  /// A single transcript
  TranscriptId {
    /// Reference genome of the id
    assembly: Assembly,
    /// Ensembl transcript id
    transcript_id: String,
  },
  /// `chromosome:start-end`, both ends inclusive
  GenomicRegion {
    /// Reference genome of the coordinates
    assembly: Assembly,
    /// Chromosome name without the `chr` prefix
    chromosome: String,
    /// First position
    start: u64,
    /// Last position
    end: u64,
  },
}

impl GenomicFilter {
  /// Path segments of the filter, using `genes`/`transcripts` as the id collection names
  fn segments(&self, genes: &str, transcripts: &str) -> Vec<String> {
    match self {
      GenomicFilter::GeneId { assembly, gene_id } => {
        vec![genes.to_string(), assembly.to_string(), gene_id.clone()]
      }
      GenomicFilter::TranscriptId { assembly, transcript_id } => {
        vec![transcripts.to_string(), assembly.to_string(), transcript_id.clone()]
      }
      GenomicFilter::GenomicRegion { assembly, chromosome, start, end } => vec![
        "genomic-regions".to_string(),
        assembly.to_string(),
        chromosome.clone(),
        start.to_string(),
        end.to_string(),
      ],
    }
  }
}
