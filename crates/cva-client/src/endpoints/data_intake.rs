//! Data intake endpoints
//!
//! Push pedigrees, participants and per-program report events into CVA.
//! Every call carries the `disable_validation` and `disable_annotation`
//! flags configured on the client.

use super::{EndpointBase, impl_endpoint_base};
use crate::query::QueryParams;
use crate::transport::{Endpoint, Transport};
use cva_core::{Program, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Kind of report event pushed for a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeKind {
  /// Variants tiered by the interpretation pipeline
  TieredVariants,
  /// Variants proposed by a decision support service
  CandidateVariants,
  /// Variants in a clinical report
  ReportedVariants,
  /// Exit questionnaires closing a case
  ExitQuestionnaires,
}

impl IntakeKind {
  fn as_str(&self) -> &'static str {
    match self {
      IntakeKind::TieredVariants => "tiered-variants",
      IntakeKind::CandidateVariants => "candidate-variants",
      IntakeKind::ReportedVariants => "reported-variants",
      IntakeKind::ExitQuestionnaires => "exit-questionnaires",
    }
  }
}

/// Data intake endpoints
pub struct DataIntakeEndpoints {
  transport: Arc<Transport>,
  disable_validation: bool,
  disable_annotation: bool,
}

impl_endpoint_base!(DataIntakeEndpoints);

impl DataIntakeEndpoints {
  /// Create a new data intake endpoints instance
  pub fn new(transport: Arc<Transport>, disable_validation: bool, disable_annotation: bool) -> Self {
    Self { transport, disable_validation, disable_annotation }
  }

  fn push_params(&self, params: QueryParams) -> QueryParams {
    let mut merged = QueryParams::new()
      .with("disable_validation", self.disable_validation)
      .with("disable_annotation", self.disable_annotation);
    merged.merge(&params);
    merged
  }

  /// Push a pedigree
  pub async fn post_pedigree<P: Serialize>(&self, pedigree: &P, params: QueryParams) -> Result<Vec<Value>> {
    self.push(Endpoint::from("pedigrees"), pedigree, params).await
  }

  /// Push a participant
  pub async fn post_participant<P: Serialize>(&self, participant: &P, params: QueryParams) -> Result<Vec<Value>> {
    self.push(Endpoint::from("participants"), participant, params).await
  }

  /// Push a tiered variant of `program`
  pub async fn post_tiered_variant<P: Serialize>(
    &self,
    program: Program,
    tiered_variant: &P,
    params: QueryParams,
  ) -> Result<Vec<Value>> {
    self.post_report_event(IntakeKind::TieredVariants, program, tiered_variant, params).await
  }

  /// Push a candidate variant of `program`
  pub async fn post_candidate_variant<P: Serialize>(
    &self,
    program: Program,
    candidate_variant: &P,
    params: QueryParams,
  ) -> Result<Vec<Value>> {
    self.post_report_event(IntakeKind::CandidateVariants, program, candidate_variant, params).await
  }

  /// Push a reported variant of `program`
  pub async fn post_reported_variant<P: Serialize>(
    &self,
    program: Program,
    reported_variant: &P,
    params: QueryParams,
  ) -> Result<Vec<Value>> {
    self.post_report_event(IntakeKind::ReportedVariants, program, reported_variant, params).await
  }

  /// Push an exit questionnaire of `program`
  pub async fn post_exit_questionnaire<P: Serialize>(
    &self,
    program: Program,
    exit_questionnaire: &P,
    params: QueryParams,
  ) -> Result<Vec<Value>> {
    self.post_report_event(IntakeKind::ExitQuestionnaires, program, exit_questionnaire, params).await
  }

  /// Push any report event kind for `program`
  pub async fn post_report_event<P: Serialize>(
    &self,
    kind: IntakeKind,
    program: Program,
    payload: &P,
    params: QueryParams,
  ) -> Result<Vec<Value>> {
    let endpoint = Endpoint::from(kind.as_str()).join(program.path_segment());
    self.push(endpoint, payload, params).await
  }

  #[instrument(skip(self, payload, params))]
  async fn push<P: Serialize>(
    &self,
    endpoint: Endpoint,
    payload: &P,
    params: QueryParams,
  ) -> Result<Vec<Value>> {
    let payload = serde_json::to_value(payload)?;
    Ok(self.transport.post(endpoint, payload, self.push_params(params)).await?.results)
  }
}
