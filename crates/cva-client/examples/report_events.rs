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

//! Report Events Example
//!
//! Reads the connection settings from the environment (or a `.env` file):
//!
//! ```text
//! CVA_URL_BASE=https://cva.example.org
//! CVA_USER=me
//! CVA_PASSWORD=secret
//! ```
//!
//! then counts the reported variants of rare disease cases, walks the first
//! pages of them and lifts a couple of variants over to GRCh38.

use anyhow::Result;
use cva_client::{CvaClient, QueryParams, VariantFormat};
use cva_core::Config;
use futures::TryStreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = Config::from_env()?;
  let client = CvaClient::connect(config).await?;

  let filter = QueryParams::new().with("program", "rare_disease").with("type", "reported");
  let total = client.report_events().count(filter.clone()).await?;
  info!("{} reported variants in rare disease cases", total);

  let mut pages = client.report_events().get_report_events(filter.limit(50)).max_results(120).pages();
  while let Some(page) = pages.try_next().await? {
    for (index, event) in page.rows() {
      println!("{:>4} {} {}", index, event["caseId"], event["reportEvent"]["reportEventId"]);
    }
  }

  let lifted = client
    .lift_overs()
    .lift_over_by_identifiers(&["GRCh37:13:32890572:G:A", "GRCh37:17:41245466:G:A"], VariantFormat::Vcf, true)
    .await?;
  for variant in lifted {
    println!("{}", variant);
  }

  if client.transport().renewals() > 0 {
    info!("Token renewed {} time(s)", client.transport().renewals());
  }
  Ok(())
}
