/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! The [`CvaClient`] facade over every endpoint group

use crate::endpoints::{
  cases::CaseEndpoints, data_intake::DataIntakeEndpoints, entities::EntityEndpoints,
  evidences::EvidenceEndpoints, lift_overs::LiftOverEndpoints, pedigrees::PedigreeEndpoints,
  report_events::ReportEventEndpoints, transactions::TransactionEndpoints,
  variants::VariantEndpoints,
};
use crate::transport::Transport;
use cva_core::{Config, Result};
use std::sync::Arc;
use tracing::info;

/// Main CVA API client
///
/// Owns one [`Transport`] (HTTP client, session token, retry policy and rate
/// limiter) shared by every endpoint group.
///
/// # Examples
///
/// ```rust,no_run
/// use cva_client::{CvaClient, QueryParams};
/// use cva_core::Config;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///   let config = Config::from_env()?;
///   let client = CvaClient::connect(config).await?;
///
///   let cases = client.cases().count(QueryParams::new().with("program", "rare_disease")).await?;
///   println!("{} rare disease cases", cases);
///
///   let variant = client.variants().get_variant_by_id("GRCh38:13:32316461:A:G").await?;
///   println!("{:?}", variant);
///   Ok(())
/// }
/// ```
pub struct CvaClient {
  transport: Arc<Transport>,
  cases: CaseEndpoints,
  report_events: ReportEventEndpoints,
  variants: VariantEndpoints,
  entities: EntityEndpoints,
  evidences: EvidenceEndpoints,
  pedigrees: PedigreeEndpoints,
  transactions: TransactionEndpoints,
  lift_overs: LiftOverEndpoints,
  data_intake: DataIntakeEndpoints,
}

impl CvaClient {
  /// Create a new CVA API client
  ///
  /// No request is made; with user/password credentials the token is
  /// obtained on the first call.
  ///
  /// # Errors
  ///
  /// Returns an error if the configuration is invalid or the HTTP client
  /// cannot be created.
  pub fn new(config: Config) -> Result<Self> {
    let transport = Arc::new(Transport::new(&config)?);
    Ok(Self::with_transport(transport, &config))
  }

  /// Create a client and authenticate straight away
  ///
  /// Fails early with [`cva_core::Error::Authentication`] when the
  /// credentials are rejected.
  pub async fn connect(config: Config) -> Result<Self> {
    let client = Self::new(config)?;
    client.transport.ensure_token().await?;
    info!("Connected to {}", client.transport.base_url());
    Ok(client)
  }

  /// Build the endpoint groups over an existing transport
  pub fn with_transport(transport: Arc<Transport>, config: &Config) -> Self {
    Self {
      cases: CaseEndpoints::new(Arc::clone(&transport)),
      report_events: ReportEventEndpoints::new(Arc::clone(&transport)),
      variants: VariantEndpoints::new(Arc::clone(&transport), config.concurrency),
      entities: EntityEndpoints::new(Arc::clone(&transport)),
      evidences: EvidenceEndpoints::new(Arc::clone(&transport)),
      pedigrees: PedigreeEndpoints::new(Arc::clone(&transport)),
      transactions: TransactionEndpoints::new(Arc::clone(&transport)),
      lift_overs: LiftOverEndpoints::new(Arc::clone(&transport)),
      data_intake: DataIntakeEndpoints::new(
        Arc::clone(&transport),
        config.disable_validation,
        config.disable_annotation,
      ),
      transport,
    }
  }

  /// Get access to case endpoints
  pub fn cases(&self) -> &CaseEndpoints {
    &self.cases
  }

  /// Get access to report event endpoints
  pub fn report_events(&self) -> &ReportEventEndpoints {
    &self.report_events
  }

  /// Get access to variant endpoints
  pub fn variants(&self) -> &VariantEndpoints {
    &self.variants
  }

  /// Get access to panel and disorder endpoints
  pub fn entities(&self) -> &EntityEndpoints {
    &self.entities
  }

  /// Get access to evidence endpoints
  pub fn evidences(&self) -> &EvidenceEndpoints {
    &self.evidences
  }

  /// Get access to pedigree endpoints
  pub fn pedigrees(&self) -> &PedigreeEndpoints {
    &self.pedigrees
  }

  /// Get access to transaction endpoints
  pub fn transactions(&self) -> &TransactionEndpoints {
    &self.transactions
  }

  /// Get access to lift over endpoints
  pub fn lift_overs(&self) -> &LiftOverEndpoints {
    &self.lift_overs
  }

  /// Get access to data intake endpoints
  pub fn data_intake(&self) -> &DataIntakeEndpoints {
    &self.data_intake
  }

  /// The shared transport, for calls no endpoint group covers
  pub fn transport(&self) -> &Arc<Transport> {
    &self.transport
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_client_shares_one_transport() {
    let mut config = Config::with_token("http://localhost:8090", "abc");
    config.rate_limit = 0;
    let client = CvaClient::new(config).unwrap();
    // the client plus nine endpoint groups
    assert_eq!(Arc::strong_count(client.transport()), 10);
  }

  #[test]
  fn test_invalid_config_is_rejected() {
    let mut config = Config::with_token("http://localhost:8090", "abc");
    config.max_retries = 0;
    assert!(CvaClient::new(config).is_err());
  }
}
