//! Panel and disorder endpoints

use super::{EndpointBase, impl_endpoint_base};
use crate::query::QueryParams;
use crate::transport::Transport;
use cva_core::Result;
use cva_models::results_to_list;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Panel and disorder endpoints
pub struct EntityEndpoints {
  transport: Arc<Transport>,
}

impl_endpoint_base!(EntityEndpoints);

impl EntityEndpoints {
  /// Create a new entity endpoints instance
  pub fn new(transport: Arc<Transport>) -> Self {
    Self { transport }
  }

  /// Summary of the gene panels used across cases, per panel version when `use_versions`
  #[instrument(skip(self))]
  pub async fn get_panels_summary(&self, use_versions: bool) -> Result<Vec<Value>> {
    self.fetch_all("panels/summary", QueryParams::new().with("use_versions", use_versions)).await
  }

  /// Identifiers of all panels, one per panel version when `include_versions`
  #[instrument(skip(self, params))]
  pub async fn get_panels(&self, include_versions: bool, params: QueryParams) -> Result<Vec<Value>> {
    let results = self.fetch_all("panels", params.with("include_versions", include_versions)).await?;
    Ok(results_to_list(results))
  }

  /// Names of all panels
  pub async fn get_all_panels(&self) -> Result<Vec<String>> {
    let summary = self.get_panels_summary(false).await?;
    Ok(pluck(&summary, "panel", "name"))
  }

  /// Summary of the disorders recorded across cases
  #[instrument(skip(self))]
  pub async fn get_disorders_summary(&self) -> Result<Vec<Value>> {
    self.fetch_all("disorders/summary", QueryParams::new()).await
  }

  /// Names of all specific diseases
  pub async fn get_all_specific_diseases(&self) -> Result<Vec<String>> {
    Ok(pluck(&self.get_disorders_summary().await?, "disorder", "specificDisease"))
  }

  /// Names of all disease groups
  pub async fn get_all_disease_groups(&self) -> Result<Vec<String>> {
    Ok(pluck(&self.get_disorders_summary().await?, "disorder", "diseaseGroup"))
  }

  /// Names of all disease subgroups
  pub async fn get_all_disease_subgroups(&self) -> Result<Vec<String>> {
    Ok(pluck(&self.get_disorders_summary().await?, "disorder", "diseaseSubGroup"))
  }
}

// entries missing the field are skipped
fn pluck(results: &[Value], outer: &str, inner: &str) -> Vec<String> {
  results
    .iter()
    .filter_map(|entry| entry.get(outer)?.get(inner)?.as_str().map(str::to_string))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_pluck() {
    let summary = vec![
      json!({"disorder": {"specificDisease": "Epilepsy", "diseaseGroup": "Neurology"}, "count": 3}),
      json!({"disorder": {"diseaseGroup": "Renal"}, "count": 1}),
    ];
    assert_eq!(pluck(&summary, "disorder", "specificDisease"), vec!["Epilepsy"]);
    assert_eq!(pluck(&summary, "disorder", "diseaseGroup"), vec!["Neurology", "Renal"]);
  }
}
