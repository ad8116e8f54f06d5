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

//! Core types, configuration and errors shared by the cva-* crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, Credentials};
pub use error::{Error, Result};
pub use types::{Assembly, Program, ReportEventType};

/// Versioned API prefix placed between the base URL and every endpoint
pub const ENDPOINT_BASE: &str = "cva/api/0";

/// Endpoint exchanging a username/password for a token
pub const AUTHENTICATION_ENDPOINT: &str = "authentication";

/// Page size query parameter
pub const LIMIT_PARAM: &str = "limit";
/// Pagination cursor query parameter
pub const MARKER_PARAM: &str = "marker";
/// Count query parameter, turns a listing into a scalar count
pub const COUNT_PARAM: &str = "count";
/// Field selector query parameter
pub const INCLUDE_PARAM: &str = "include";
/// Aggregation query parameter, asks for buckets instead of bare identifiers
pub const INCLUDE_AGGREGATIONS_PARAM: &str = "include_aggregations";

/// Response header carrying the page size of the next page
pub const LIMIT_HEADER: &str = "X-Pagination-Limit";
/// Response header carrying the next page cursor
pub const MARKER_HEADER: &str = "X-Pagination-Marker";

/// Prefix of the Authorization header value
pub const BEARER_PREFIX: &str = "Bearer ";

/// Default deployment used when `CVA_URL_BASE` is not set
pub const DEFAULT_URL_BASE: &str = "http://localhost:8090";

/// Defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;
pub const DEFAULT_RATE_LIMIT: u32 = 600; // requests per minute
pub const DEFAULT_CONCURRENCY: usize = 10;
