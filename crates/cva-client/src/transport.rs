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

//! HTTP transport layer for CVA API requests
//!
//! Every call goes to `{base_url}/cva/api/0/{endpoint}`, carries
//! `Accept: application/json` and, once known, `Authorization: Bearer <token>`.
//! Responses are classified by status code; the first 401/403 of a call renews
//! the token and re-issues the request, transient failures are retried with
//! exponential backoff, and 404 is normalised to an empty result.

use crate::query::QueryParams;
use crate::retry::RetryPolicy;
use cva_core::{
  AUTHENTICATION_ENDPOINT, BEARER_PREFIX, Config, Credentials, ENDPOINT_BASE, Error,
  LIMIT_HEADER, MARKER_HEADER, Result,
};
use cva_models::{Cursor, ResponseEnvelope};
use governor::{
  Quota, RateLimiter,
  clock::DefaultClock,
  middleware::NoOpMiddleware,
  state::{InMemoryState, NotKeyed},
};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde_json::{Value, json};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Logical endpoint below the API prefix, as an ordered list of path segments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
  segments: Vec<String>,
}

impl Endpoint {
  /// Endpoint made of the given segments, empty ones are dropped
  pub fn new<I, S>(segments: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: ToString,
  {
    Self {
      segments: segments.into_iter().map(|s| s.to_string()).filter(|s| !s.is_empty()).collect(),
    }
  }

  /// Append one segment. Slashes inside it are encoded, not treated as separators.
  pub fn join(mut self, segment: impl ToString) -> Self {
    let segment = segment.to_string();
    if !segment.is_empty() {
      self.segments.push(segment);
    }
    self
  }

  /// The path segments
  pub fn segments(&self) -> &[String] {
    &self.segments
  }
}

impl From<&str> for Endpoint {
  fn from(path: &str) -> Self {
    Endpoint::new(path.split('/'))
  }
}

impl From<String> for Endpoint {
  fn from(path: String) -> Self {
    Endpoint::from(path.as_str())
  }
}

impl From<&String> for Endpoint {
  fn from(path: &String) -> Self {
    Endpoint::from(path.as_str())
  }
}

impl From<Vec<String>> for Endpoint {
  fn from(segments: Vec<String>) -> Self {
    Endpoint::new(segments)
  }
}

impl From<&[&str]> for Endpoint {
  fn from(segments: &[&str]) -> Self {
    Endpoint::new(segments.iter().copied())
  }
}

impl From<&Endpoint> for Endpoint {
  fn from(endpoint: &Endpoint) -> Self {
    endpoint.clone()
  }
}

impl std::fmt::Display for Endpoint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.segments.join("/"))
  }
}

/// One logical call against the service
#[derive(Debug, Clone)]
pub struct Request {
  /// HTTP method
  pub method: Method,
  /// Path below the versioned API prefix
  pub endpoint: Endpoint,
  /// Query string
  pub params: QueryParams,
  /// JSON body, sent for POST only
  pub payload: Option<Value>,
  /// When true (the default) a 404 yields an empty result instead of an error
  pub not_found_is_empty: bool,
}

impl Request {
  fn new(method: Method, endpoint: impl Into<Endpoint>) -> Self {
    Self {
      method,
      endpoint: endpoint.into(),
      params: QueryParams::new(),
      payload: None,
      not_found_is_empty: true,
    }
  }

  /// GET request
  pub fn get(endpoint: impl Into<Endpoint>) -> Self {
    Self::new(Method::GET, endpoint)
  }

  /// POST request with a JSON payload
  pub fn post(endpoint: impl Into<Endpoint>, payload: Value) -> Self {
    let mut request = Self::new(Method::POST, endpoint);
    request.payload = Some(payload);
    request
  }

  /// PATCH request
  pub fn patch(endpoint: impl Into<Endpoint>) -> Self {
    Self::new(Method::PATCH, endpoint)
  }

  /// DELETE request
  pub fn delete(endpoint: impl Into<Endpoint>) -> Self {
    Self::new(Method::DELETE, endpoint)
  }

  /// Replace the query parameters
  pub fn params(mut self, params: QueryParams) -> Self {
    self.params = params;
    self
  }

  /// Treat 404 as [`Error::NotFound`] instead of an empty result
  pub fn require_existence(mut self) -> Self {
    self.not_found_is_empty = false;
    self
  }
}

/// Unwrapped result of a call plus the cursor of the next page, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
  /// Unwrapped `response[0].result`, empty on a tolerated 404
  pub results: Vec<Value>,
  /// Cursor of the next page when the pagination headers were present
  pub next_page: Option<Cursor>,
}

impl ApiResponse {
  /// `(results, next_page)`
  pub fn into_parts(self) -> (Vec<Value>, Option<Cursor>) {
    (self.results, self.next_page)
  }
}

/// What the transport does with a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusClass {
  Success,
  RenewToken,
  NotFound,
  Client,
  Server,
  Other,
}

/// Map a status code to the action taken on it.
///
/// `renewed` is whether the token was already renewed during this call,
/// `can_renew` whether the credentials allow renewing at all.
pub(crate) fn classify(status: u16, renewed: bool, can_renew: bool) -> StatusClass {
  match status {
    200..=299 => StatusClass::Success,
    401 | 403 if !renewed && can_renew => StatusClass::RenewToken,
    404 => StatusClass::NotFound,
    400..=499 => StatusClass::Client,
    500..=599 => StatusClass::Server,
    _ => StatusClass::Other,
  }
}

/// Token state and default headers of one transport
struct Session {
  headers: HeaderMap,
  token: RwLock<Option<String>>,
  renewed: AtomicBool,
  renewals: AtomicU32,
}

impl Session {
  fn new(token: Option<String>) -> Self {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Self {
      headers,
      token: RwLock::new(token),
      renewed: AtomicBool::new(false),
      renewals: AtomicU32::new(0),
    }
  }
}

/// Format a token as an Authorization header value.
///
/// A `Bearer ` prefix already present on the token is not repeated.
pub fn bearer(token: &str) -> String {
  let token = token.trim();
  format!("{}{}", BEARER_PREFIX, token.strip_prefix(BEARER_PREFIX).unwrap_or(token))
}

/// HTTP transport layer for making requests to the CVA API
pub struct Transport {
  client: Client,
  base_url: Url,
  credentials: Credentials,
  session: Session,
  retry: RetryPolicy,
  rate_limiter: Option<DirectRateLimiter>,
  timeout: Duration,
}

impl Transport {
  /// Create a new transport instance.
  ///
  /// No network call is made; with user/password credentials the token is
  /// fetched on the first request (or by [`Transport::authenticate`]).
  pub fn new(config: &Config) -> Result<Self> {
    config.validate()?;

    let base_url = Url::parse(config.base_url.trim())
      .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", config.base_url, e)))?;
    if base_url.cannot_be_a_base() {
      return Err(Error::Config(format!("Base URL '{}' cannot hold a path", config.base_url)));
    }

    let timeout = Duration::from_secs(config.timeout_secs);
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(concat!("cva-client/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

    let token = match &config.credentials {
      Credentials::Token(token) => Some(bearer(token)),
      Credentials::UserPassword { .. } => None,
    };

    let rate_limiter =
      NonZeroU32::new(config.rate_limit).map(|n| RateLimiter::direct(Quota::per_minute(n)));

    Ok(Self {
      client,
      base_url,
      credentials: config.credentials.clone(),
      session: Session::new(token),
      retry: RetryPolicy::from_config(config),
      rate_limiter,
      timeout,
    })
  }

  /// Create a mock transport for testing
  #[cfg(test)]
  pub fn new_mock() -> Self {
    let mut config = Config::with_token("https://mock.cva.local", "test-token");
    config.rate_limit = 0;
    Self::new(&config).expect("mock config is valid")
  }

  /// GET `endpoint`
  pub async fn get(&self, endpoint: impl Into<Endpoint>, params: QueryParams) -> Result<ApiResponse> {
    self.execute(Request::get(endpoint).params(params)).await
  }

  /// POST `payload` to `endpoint`
  pub async fn post(
    &self,
    endpoint: impl Into<Endpoint>,
    payload: Value,
    params: QueryParams,
  ) -> Result<ApiResponse> {
    self.execute(Request::post(endpoint, payload).params(params)).await
  }

  /// PATCH `endpoint`. Transient failures are not retried.
  pub async fn patch(&self, endpoint: impl Into<Endpoint>, params: QueryParams) -> Result<ApiResponse> {
    self.execute(Request::patch(endpoint).params(params)).await
  }

  /// DELETE `endpoint`
  pub async fn delete(&self, endpoint: impl Into<Endpoint>, params: QueryParams) -> Result<ApiResponse> {
    self.execute(Request::delete(endpoint).params(params)).await
  }

  /// GET `endpoint` with `count=true` and return the scalar count
  pub async fn count(&self, endpoint: impl Into<Endpoint>, params: QueryParams) -> Result<u64> {
    let response = self.get(endpoint, params.count(true)).await?;
    match response.results.first() {
      None => Ok(0),
      Some(Value::Number(n)) => {
        n.as_u64().ok_or_else(|| Error::Parse(format!("Count is not a non-negative integer: {}", n)))
      }
      Some(Value::String(s)) => {
        s.trim().parse().map_err(|_| Error::Parse(format!("Count is not an integer: {}", s)))
      }
      Some(other) => Err(Error::Parse(format!("Unexpected count result: {}", other))),
    }
  }

  /// Issue a request with authentication, classification and retries
  #[instrument(skip(self, request), fields(method = %request.method, endpoint = %request.endpoint))]
  pub async fn execute(&self, request: Request) -> Result<ApiResponse> {
    request.params.validate()?;
    let url = self.build_url(&request.endpoint)?;
    let request_line = format!("{} {}?{}", request.method, url, request.params.to_log_string());
    let policy = if request.method == Method::PATCH { RetryPolicy::none() } else { self.retry };

    // one renewal per call, shared by every attempt
    let renewed = &AtomicBool::new(false);
    let (request, url, request_line) = (&request, &url, request_line.as_str());

    let response = policy
      .execute(request_line, move || async move {
        let token = self.ensure_token().await?;
        match self.send_once(request, url, request_line, Some(&token), renewed.load(Ordering::SeqCst)).await {
          Err(Error::AuthExpired { status }) if !renewed.swap(true, Ordering::SeqCst) => {
            warn!("{} returned {}, renewing token", request_line, status);
            let token = self.renew_token(&token).await?;
            self.send_once(request, url, request_line, Some(&token), true).await
          }
          other => other,
        }
      })
      .await?;

    // a later 401 may renew again
    self.session.renewed.store(false, Ordering::SeqCst);
    Ok(response)
  }

  /// Exchange the username/password for a new bearer token.
  ///
  /// The session is not touched; see [`Transport::renew_token`].
  pub async fn authenticate(&self) -> Result<String> {
    let (username, password) = match &self.credentials {
      Credentials::UserPassword { username, password } => (username, password),
      Credentials::Token(_) => {
        return Err(Error::Authentication(
          "a pre-issued token cannot be renewed without user/password".to_string(),
        ));
      }
    };

    let request = Request::post(
      AUTHENTICATION_ENDPOINT,
      json!({ "username": username, "password": password }),
    );
    let url = self.build_url(&request.endpoint)?;
    let request_line = format!("POST {}", url);

    let response = self
      .retry
      .execute(&request_line, || self.send_once(&request, &url, &request_line, None, true))
      .await
      .map_err(|e| match e {
        Error::Client { status: status @ (401 | 403), body } => {
          Error::Authentication(format!("{}: {}", status, body))
        }
        other => other,
      })?;

    extract_token(response.results)
  }

  /// Replace `stale` with a freshly issued token.
  ///
  /// Renewals are serialised on the session lock. When another request
  /// already replaced `stale`, its token is reused and no exchange happens.
  pub async fn renew_token(&self, stale: &str) -> Result<String> {
    let mut current = self.session.token.write().await;
    if let Some(token) = current.as_ref() {
      if token != stale {
        debug!("Token already renewed by a concurrent request");
        return Ok(token.clone());
      }
    }

    let token = self.authenticate().await?;
    *current = Some(token.clone());
    self.session.renewed.store(true, Ordering::SeqCst);
    self.session.renewals.fetch_add(1, Ordering::SeqCst);
    info!("Authentication token renewed");
    Ok(token)
  }

  /// Current token, authenticating first when none is known yet
  pub(crate) async fn ensure_token(&self) -> Result<String> {
    let known = self.session.token.read().await.clone();
    if let Some(token) = known {
      return Ok(token);
    }

    let mut current = self.session.token.write().await;
    if let Some(token) = current.as_ref() {
      return Ok(token.clone());
    }
    let token = self.authenticate().await?;
    *current = Some(token.clone());
    Ok(token)
  }

  /// One HTTP round trip, classified
  async fn send_once(
    &self,
    request: &Request,
    url: &Url,
    request_line: &str,
    token: Option<&str>,
    renewed: bool,
  ) -> Result<ApiResponse> {
    if let Some(limiter) = &self.rate_limiter {
      limiter.until_ready().await;
    }

    let mut builder = self
      .client
      .request(request.method.clone(), url.clone())
      .headers(self.session.headers.clone())
      .query(&request.params.to_pairs());
    if let Some(token) = token {
      let value = HeaderValue::from_str(token)
        .map_err(|_| Error::Authentication("token is not a valid header value".to_string()))?;
      builder = builder.header(AUTHORIZATION, value);
    }
    if let Some(payload) = &request.payload {
      builder = builder.json(payload);
    }

    info!("{}", request_line);
    let response = builder.send().await.map_err(|e| {
      error!("{} failed: {}", request_line, e);
      Error::Network(format!("Request failed: {}", e))
    })?;

    let status = response.status().as_u16();
    let next_page = next_page_cursor(response.headers());
    let body = response
      .text()
      .await
      .map_err(|e| Error::Network(format!("Failed to read response body: {}", e)))?;
    debug!("{} response status code {}", request_line, status);

    let can_renew = token.is_some() && self.credentials.can_renew();
    match classify(status, renewed, can_renew) {
      StatusClass::Success => {
        let results = unwrap_envelope(&body, request_line)?;
        Ok(ApiResponse { results, next_page })
      }
      StatusClass::RenewToken => {
        log_failure(request_line, status, &body);
        Err(Error::AuthExpired { status })
      }
      StatusClass::NotFound if request.not_found_is_empty => {
        debug!("{} found no results", request_line);
        Ok(ApiResponse::default())
      }
      StatusClass::NotFound => {
        log_failure(request_line, status, &body);
        Err(Error::NotFound(request.endpoint.to_string()))
      }
      StatusClass::Client => {
        log_failure(request_line, status, &body);
        Err(Error::Client { status, body })
      }
      StatusClass::Server => {
        log_failure(request_line, status, &body);
        Err(Error::Server { status, body })
      }
      StatusClass::Other => {
        log_failure(request_line, status, &body);
        Err(Error::UnexpectedStatus { status, body })
      }
    }
  }

  /// Build the full URL for an endpoint
  pub fn build_url(&self, endpoint: &Endpoint) -> Result<Url> {
    let mut url = self.base_url.clone();
    {
      let mut segments = url
        .path_segments_mut()
        .map_err(|_| Error::Config(format!("Base URL '{}' cannot hold a path", self.base_url)))?;
      segments.pop_if_empty();
      segments.extend(ENDPOINT_BASE.split('/'));
      segments.extend(endpoint.segments());
    }
    Ok(url)
  }

  /// Get the base URL being used
  pub fn base_url(&self) -> &str {
    self.base_url.as_str()
  }

  /// Get request timeout duration
  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  /// Retry policy applied to GET, POST and DELETE
  pub fn retry_policy(&self) -> RetryPolicy {
    self.retry
  }

  /// Authorization header value currently in use, if any
  pub async fn token(&self) -> Option<String> {
    self.session.token.read().await.clone()
  }

  /// Whether the token was renewed and no request has succeeded since
  pub fn token_renewed(&self) -> bool {
    self.session.renewed.load(Ordering::SeqCst)
  }

  /// How many times the token has been renewed after a 401/403
  pub fn renewals(&self) -> u32 {
    self.session.renewals.load(Ordering::SeqCst)
  }
}

impl std::fmt::Debug for Transport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Transport")
      .field("base_url", &self.base_url.as_str())
      .field("credentials", &self.credentials)
      .field("retry", &self.retry)
      .field("rate_limited", &self.rate_limiter.is_some())
      .field("timeout", &self.timeout)
      .finish()
  }
}

fn next_page_cursor(headers: &HeaderMap) -> Option<Cursor> {
  let value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
  Cursor::from_header_values(value(LIMIT_HEADER), value(MARKER_HEADER))
}

fn unwrap_envelope(body: &str, request_line: &str) -> Result<Vec<Value>> {
  if body.trim().is_empty() {
    return Ok(Vec::new());
  }

  let envelope: ResponseEnvelope = serde_json::from_str(body).map_err(|e| {
    error!("{}: failed to parse response: {}", request_line, e);
    Error::Parse(format!("Failed to parse response: {}. Response: {}", e, preview(body)))
  })?;

  if let Some(time) = envelope.time {
    debug!("Response time : {} ms", time);
  }
  if let Some(message) = envelope.error_message() {
    error!("{}", request_line);
    error!("{}", message);
    return Err(Error::Service(message));
  }
  if let Some(message) = envelope.warning_message() {
    warn!("{}", message);
  }
  Ok(envelope.into_results())
}

fn extract_token(results: Vec<Value>) -> Result<String> {
  let [result] = <[Value; 1]>::try_from(results).map_err(|results| {
    Error::Authentication(format!("expected one result, got {}", results.len()))
  })?;
  match result.get("token") {
    Some(Value::String(token)) if !token.trim().is_empty() => Ok(bearer(token)),
    _ => Err(Error::Authentication("response carries no token".to_string())),
  }
}

fn log_failure(request_line: &str, status: u16, body: &str) {
  error!("{}", request_line);
  error!("{} - {}", status, preview(body));
}

fn preview(body: &str) -> String {
  body.chars().take(500).collect()
}
