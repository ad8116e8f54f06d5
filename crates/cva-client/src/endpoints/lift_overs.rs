//! Lift over endpoints
//!
//! Convert variant coordinates between GRCh37 and GRCh38.

use super::{EndpointBase, impl_endpoint_base};
use crate::query::QueryParams;
use crate::transport::Transport;
use cva_core::{Error, Result};
use cva_models::{VariantCoordinates, VariantsCoordinates};
use std::sync::Arc;
use tracing::instrument;

const BASE_ENDPOINT: &str = "lift-overs";

/// Coordinate convention of the lifted variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariantFormat {
  /// VCF positions and alleles
  #[default]
  Vcf,
  /// OpenCB normalised positions and alleles
  OpenCb,
}

impl std::fmt::Display for VariantFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      VariantFormat::Vcf => write!(f, "VCF"),
      VariantFormat::OpenCb => write!(f, "OPENCB"),
    }
  }
}

/// Lift over endpoints
pub struct LiftOverEndpoints {
  transport: Arc<Transport>,
}

impl_endpoint_base!(LiftOverEndpoints);

impl LiftOverEndpoints {
  /// Create a new lift over endpoints instance
  pub fn new(transport: Arc<Transport>) -> Self {
    Self { transport }
  }

  /// Lift over variants given as `assembly:chromosome:position:ref:alt` identifiers
  ///
  /// With `force_symmetric` only lift overs that map back to the input are returned.
  pub async fn lift_over_by_identifiers<S: AsRef<str>>(
    &self,
    variant_identifiers: &[S],
    variant_format: VariantFormat,
    force_symmetric: bool,
  ) -> Result<Vec<VariantCoordinates>> {
    let variants = variant_identifiers
      .iter()
      .map(|id| id.as_ref().parse())
      .collect::<Result<Vec<VariantCoordinates>>>()?;
    self.lift_over(variants, variant_format, force_symmetric).await
  }

  /// Lift over variants given as coordinates
  #[instrument(skip(self, variants), fields(variants = variants.len()))]
  pub async fn lift_over(
    &self,
    variants: Vec<VariantCoordinates>,
    variant_format: VariantFormat,
    force_symmetric: bool,
  ) -> Result<Vec<VariantCoordinates>> {
    let expected = variants.len();
    let payload = serde_json::to_value(VariantsCoordinates { variants })?;
    let params = QueryParams::new()
      .with("variantFormat", variant_format)
      .with("forceSymmetric", force_symmetric);

    let results = self.transport.post(BASE_ENDPOINT, payload, params).await?.results;
    if results.len() != expected {
      return Err(Error::Service(format!(
        "Some variants failed to lift over: {} requested, {} returned",
        expected,
        results.len()
      )));
    }

    results.into_iter().map(|value| serde_json::from_value(value).map_err(Error::from)).collect()
  }
}
