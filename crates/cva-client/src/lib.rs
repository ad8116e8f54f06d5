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

//! # cva-client
//!
//! Async client for the CVA (Clinical Variant Ark) REST API.
//!
//! ## Features
//!
//! - **Authenticated transport**: bearer tokens obtained from a username and
//!   password, renewed once per call when the service answers 401/403
//! - **Resilient**: exponential backoff on connection failures and 5xx
//! - **Cursor pagination**: lazy streams driven by the
//!   `X-Pagination-Limit`/`X-Pagination-Marker` headers
//! - **Bounded parallelism**: fetch many entities by id with a fixed number of
//!   requests in flight
//! - **Configurable**: environment-based configuration via cva-core
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cva_client::{CvaClient, QueryParams};
//! use cva_core::Config;
//! use futures::TryStreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let client = CvaClient::new(Config::from_env()?)?;
//!
//!   let mut cases = client.cases().get_cases(QueryParams::new().limit(50)).max_results(200).pages();
//!   while let Some(page) = cases.try_next().await? {
//!     for (index, case) in page.rows() {
//!       println!("{} {}", index, case["identifier"]);
//!     }
//!   }
//!   Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All methods return `Result<T, cva_core::Error>`. A 404 is an empty result,
//! not an error.

#![deny(missing_docs)]

pub mod batch;
pub mod client;
pub mod endpoints;
pub mod pagination;
pub mod query;
pub mod retry;
pub mod transport;

// Re-export the main client and common types
pub use batch::{fetch_by_ids, fetch_by_ids_with};
pub use client::CvaClient;
pub use cva_core::{Config, Credentials, Error, Result};
pub use pagination::{Listing, Page, Paginator};
pub use query::{ParamValue, QueryParams};
pub use retry::RetryPolicy;
pub use transport::{ApiResponse, Endpoint, Request, Transport};

pub use endpoints::{
  cases::{CaseEndpoints, CaseFilter, OutputEntity},
  data_intake::{DataIntakeEndpoints, IntakeKind},
  entities::EntityEndpoints,
  evidences::EvidenceEndpoints,
  lift_overs::{LiftOverEndpoints, VariantFormat},
  pedigrees::PedigreeEndpoints,
  report_events::ReportEventEndpoints,
  transactions::TransactionEndpoints,
  variants::VariantEndpoints,
  Aggregation, EndpointBase, GenomicFilter,
};
