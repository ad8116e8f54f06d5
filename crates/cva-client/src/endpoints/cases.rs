//! Case endpoints
//!
//! This module provides access to the cases stored in CVA:
//! - Case listings, counts and summaries
//! - Single cases by identifier and version
//! - Variants, phenotypes and genes observed in cases by gene, transcript,
//!   panel or genomic region
//! - Similar cases and cases sharing variants or genes with a given case

use super::{Aggregation, EndpointBase, impl_endpoint_base};
use crate::pagination::Paginator;
use crate::query::QueryParams;
use crate::transport::{Endpoint, Transport};
use cva_core::{Assembly, Result, ReportEventType};
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, warn};

const BASE_ENDPOINT: &str = "cases";

/// Which cases an aggregation runs over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseFilter {
  /// Cases with report events in a gene
  GeneId {
    /// Reference genome of the id
    assembly: Assembly,
    /// Ensembl gene id
    gene_id: String,
  },
  /// Cases with report events in a transcript
  TranscriptId {
    /// Reference genome of the id
    assembly: Assembly,
    /// Ensembl transcript id
    transcript_id: String,
  },
  /// Cases with report events in a gene, by HGNC symbol
  GeneSymbol {
    /// Reference genome of the gene
    assembly: Assembly,
    /// HGNC gene symbol
    gene_symbol: String,
  },
  /// Cases analysed with a gene panel
  Panel {
    /// Panel name as shown in the panels summary
    panel_name: String,
  },
  /// Cases with report events in a region
  GenomicRegion {
    /// Reference genome of the coordinates
    assembly: Assembly,
    /// Chromosome name
    chromosome: String,
    /// First position
    start: u64,
    /// Last position
    end: u64,
  },
}

impl CaseFilter {
  fn segments(&self) -> Vec<String> {
    match self {
      CaseFilter::GeneId { assembly, gene_id } => {
        vec!["gene-ids".to_string(), assembly.to_string(), gene_id.clone()]
      }
      CaseFilter::TranscriptId { assembly, transcript_id } => {
        vec!["transcript-ids".to_string(), assembly.to_string(), transcript_id.clone()]
      }
      CaseFilter::GeneSymbol { assembly, gene_symbol } => {
        vec!["gene-symbols".to_string(), assembly.to_string(), gene_symbol.clone()]
      }
      CaseFilter::Panel { panel_name } => vec!["panels".to_string(), panel_name.clone()],
      CaseFilter::GenomicRegion { assembly, chromosome, start, end } => vec![
        "genomic-regions".to_string(),
        assembly.to_string(),
        chromosome.clone(),
        start.to_string(),
        end.to_string(),
      ],
    }
  }
}

/// What an aggregation over cases returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEntity {
  /// Variants seen in the selected cases
  Variants,
  /// HPO terms of the selected cases
  Phenotypes,
  /// Genes with report events in the selected cases
  Genes,
}

impl OutputEntity {
  fn as_str(&self) -> &'static str {
    match self {
      OutputEntity::Variants => "variants",
      OutputEntity::Phenotypes => "phenotypes",
      OutputEntity::Genes => "genes",
    }
  }
}

/// Case endpoints
pub struct CaseEndpoints {
  transport: Arc<Transport>,
}

impl_endpoint_base!(CaseEndpoints);

impl CaseEndpoints {
  /// Create a new case endpoints instance
  pub fn new(transport: Arc<Transport>) -> Self {
    Self { transport }
  }

  fn endpoint() -> Endpoint {
    Endpoint::from(BASE_ENDPOINT)
  }

  /// Number of cases matching `params`
  #[instrument(skip(self, params), fields(params = %params.to_log_string()))]
  pub async fn count(&self, params: QueryParams) -> Result<u64> {
    self.transport.count(Self::endpoint(), params).await
  }

  /// All cases matching `params`, page by page
  pub fn get_cases(&self, params: QueryParams) -> Paginator {
    self.paginate(Self::endpoint(), params)
  }

  /// A single case
  #[instrument(skip(self))]
  pub async fn get_case(&self, identifier: &str, version: u32) -> Result<Option<Value>> {
    let case = self.fetch_one(Self::endpoint().join(identifier).join(version), QueryParams::new()).await?;
    if case.is_none() {
      warn!("No case found with id-version {}-{}", identifier, version);
    }
    Ok(case)
  }

  /// Several cases in one call, by comma separated identifiers
  #[instrument(skip(self, identifiers), fields(identifiers = identifiers.len()))]
  pub async fn get_cases_by_identifiers(&self, identifiers: &[&str]) -> Result<Vec<Value>> {
    self.fetch_all(Self::endpoint().join(identifiers.join(",")), QueryParams::new()).await
  }

  /// Summary of the cases matching `params`
  #[instrument(skip(self, params), fields(params = %params.to_log_string()))]
  pub async fn get_summary(&self, params: QueryParams) -> Result<Option<Value>> {
    let summary = self.fetch_one(Self::endpoint().join("summary"), params).await?;
    if summary.is_none() {
      warn!("No summary found");
    }
    Ok(summary)
  }

  /// Free text search over cases
  #[instrument(skip(self))]
  pub async fn search(&self, query: &str) -> Result<Vec<Value>> {
    self.fetch_all(Self::endpoint().join("search").join(query), QueryParams::new()).await
  }

  /// Variants, phenotypes or genes observed in the cases selected by `filter`
  ///
  /// With `include_aggregations` each entity comes with its aggregated
  /// counts, keyed by entity; otherwise only the entity identifiers.
  #[instrument(skip(self, params))]
  pub async fn get_by(
    &self,
    filter: &CaseFilter,
    output: OutputEntity,
    include_aggregations: bool,
    params: QueryParams,
  ) -> Result<Aggregation> {
    let mut endpoint = Self::endpoint();
    for segment in filter.segments() {
      endpoint = endpoint.join(segment);
    }
    self.aggregation(endpoint.join(output.as_str()), include_aggregations, params).await
  }

  /// Cases phenotypically similar to a case
  #[instrument(skip(self, params))]
  pub async fn similar_cases_by_case(
    &self,
    case_id: &str,
    case_version: u32,
    params: QueryParams,
  ) -> Result<Vec<Value>> {
    let endpoint = Self::endpoint().join(case_id).join(case_version).join("similar-cases");
    let results = self.fetch_all(endpoint, params).await?;
    if results.is_empty() {
      warn!("No similar cases found");
    }
    Ok(results)
  }

  /// Cases similar to a set of HPO terms
  #[instrument(skip(self, phenotypes, params), fields(phenotypes = phenotypes.len()))]
  pub async fn similar_cases_by_phenotypes(
    &self,
    phenotypes: &[&str],
    params: QueryParams,
  ) -> Result<Vec<Value>> {
    let endpoint = Self::endpoint().join("phenotypes").join("similar-cases");
    let results = self.fetch_all(endpoint, params.with_list("hpoIds", phenotypes)).await?;
    if results.is_empty() {
      warn!("No similar cases found");
    }
    Ok(results)
  }

  /// Cases sharing report events of `report_event_type` variants with a case
  pub async fn shared_variants(
    &self,
    case_id: &str,
    case_version: u32,
    report_event_type: ReportEventType,
    params: QueryParams,
  ) -> Result<Vec<Value>> {
    self.shared(case_id, case_version, "shared-variants", report_event_type, params).await
  }

  /// Cases sharing report events of `report_event_type` in the same genes as a case
  pub async fn shared_genes(
    &self,
    case_id: &str,
    case_version: u32,
    report_event_type: ReportEventType,
    params: QueryParams,
  ) -> Result<Vec<Value>> {
    self.shared(case_id, case_version, "shared-genes", report_event_type, params).await
  }

  #[instrument(skip(self, params))]
  async fn shared(
    &self,
    case_id: &str,
    case_version: u32,
    what: &str,
    report_event_type: ReportEventType,
    params: QueryParams,
  ) -> Result<Vec<Value>> {
    let endpoint = Self::endpoint().join(case_id).join(case_version).join(what);
    let results = self.fetch_all(endpoint, params.with("type", report_event_type)).await?;
    if results.is_empty() {
      warn!("No cases sharing {} {} found", report_event_type, what);
    }
    Ok(results)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_case_filter_paths() {
    let filter = CaseFilter::GeneSymbol { assembly: Assembly::GRCh38, gene_symbol: "BRCA2".to_string() };
    assert_eq!(filter.segments(), ["gene-symbols", "GRCh38", "BRCA2"]);

    let filter = CaseFilter::Panel { panel_name: "Intellectual disability".to_string() };
    assert_eq!(filter.segments(), ["panels", "Intellectual disability"]);
  }

  #[test]
  fn test_output_entity_names() {
    assert_eq!(OutputEntity::Phenotypes.as_str(), "phenotypes");
    assert_eq!(OutputEntity::Genes.as_str(), "genes");
  }
}
