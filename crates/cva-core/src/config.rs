//! Configuration management for the CVA client

use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;

/// Credentials used to obtain a bearer token.
///
/// Exactly one form is ever active: either a pre-issued token, or a
/// username/password pair exchanged for a token against the authentication
/// endpoint.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub enum Credentials {
  /// Pre-issued token. Cannot be renewed.
  Token(String),
  /// Username and password. The password may be empty.
  UserPassword { username: String, password: String },
}

impl Credentials {
  /// Build credentials from optional parts.
  ///
  /// A token and a user must not both be given; with neither, the result is
  /// [`Error::MissingCredentials`].
  pub fn from_parts(
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
  ) -> Result<Self> {
    let token = token.filter(|t| !t.trim().is_empty());
    let username = username.filter(|u| !u.is_empty());

    match (token, username) {
      (Some(_), Some(_)) => {
        Err(Error::Config("Both a token and user/password were supplied".to_string()))
      }
      (Some(token), None) => Ok(Credentials::Token(token)),
      (None, Some(username)) => match password {
        Some(password) => Ok(Credentials::UserPassword { username, password }),
        None => Err(Error::MissingCredentials),
      },
      (None, None) => Err(Error::MissingCredentials),
    }
  }

  /// Whether an expired token can be replaced by authenticating again
  pub fn can_renew(&self) -> bool {
    matches!(self, Credentials::UserPassword { .. })
  }
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Credentials::Token(_) => f.debug_tuple("Token").field(&"***").finish(),
      Credentials::UserPassword { username, .. } => f
        .debug_struct("UserPassword")
        .field("username", username)
        .field("password", &"***")
        .finish(),
    }
  }
}

/// Main configuration struct for the CVA client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// Base URL of the CVA deployment, without the API prefix
  pub base_url: String,

  /// Token or user/password. Never serialized.
  #[serde(skip_serializing)]
  pub credentials: Credentials,

  /// Request timeout in seconds
  pub timeout_secs: u64,

  /// Maximum attempts for retryable failures
  pub max_retries: u32,

  /// Initial backoff between retries in milliseconds, doubled per attempt
  pub retry_backoff_ms: u64,

  /// Client-side rate limit (requests per minute), 0 disables it
  pub rate_limit: u32,

  /// Workers used by the bulk by-id lookups
  pub concurrency: usize,

  /// Sent as `disable_validation` on data intake posts
  pub disable_validation: bool,

  /// Sent as `disable_annotation` on data intake posts
  pub disable_annotation: bool,
}

impl Config {
  /// Load configuration from environment variables
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Load configuration from any key lookup, `from_env` uses the process environment
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let credentials =
      Credentials::from_parts(lookup("CVA_TOKEN"), lookup("CVA_USER"), lookup("CVA_PASSWORD"))?;

    let base_url = lookup("CVA_URL_BASE").unwrap_or_else(|| crate::DEFAULT_URL_BASE.to_string());

    let timeout_secs = parse_or(&lookup, "CVA_TIMEOUT_SECS", crate::DEFAULT_TIMEOUT_SECS)?;
    let max_retries = parse_or(&lookup, "CVA_MAX_RETRIES", crate::DEFAULT_MAX_RETRIES)?;
    let retry_backoff_ms =
      parse_or(&lookup, "CVA_RETRY_BACKOFF_MS", crate::DEFAULT_RETRY_BACKOFF_MS)?;
    let rate_limit = parse_or(&lookup, "CVA_RATE_LIMIT", crate::DEFAULT_RATE_LIMIT)?;
    let concurrency = parse_or(&lookup, "CVA_CONCURRENCY", crate::DEFAULT_CONCURRENCY)?;
    let disable_validation = parse_or(&lookup, "CVA_DISABLE_VALIDATION", true)?;
    let disable_annotation = parse_or(&lookup, "CVA_DISABLE_ANNOTATION", false)?;

    Ok(Config {
      base_url,
      credentials,
      timeout_secs,
      max_retries,
      retry_backoff_ms,
      rate_limit,
      concurrency,
      disable_validation,
      disable_annotation,
    })
  }

  /// Create a config with default values around the given credentials
  pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
    Config {
      base_url: base_url.into(),
      credentials,
      timeout_secs: crate::DEFAULT_TIMEOUT_SECS,
      max_retries: crate::DEFAULT_MAX_RETRIES,
      retry_backoff_ms: crate::DEFAULT_RETRY_BACKOFF_MS,
      rate_limit: crate::DEFAULT_RATE_LIMIT,
      concurrency: crate::DEFAULT_CONCURRENCY,
      disable_validation: true,
      disable_annotation: false,
    }
  }

  /// Config authenticating with a pre-issued token
  pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
    Self::new(base_url, Credentials::Token(token.into()))
  }

  /// Config authenticating with a username and password
  pub fn with_user_password(
    base_url: impl Into<String>,
    username: impl Into<String>,
    password: impl Into<String>,
  ) -> Self {
    Self::new(
      base_url,
      Credentials::UserPassword { username: username.into(), password: password.into() },
    )
  }

  /// Check the values a client cannot work without
  pub fn validate(&self) -> Result<()> {
    if self.base_url.trim().is_empty() {
      return Err(Error::Config("Base URL is empty".to_string()));
    }
    if let Credentials::Token(token) = &self.credentials {
      if token.trim().is_empty() {
        return Err(Error::MissingCredentials);
      }
    }
    if let Credentials::UserPassword { username, .. } = &self.credentials {
      if username.is_empty() {
        return Err(Error::MissingCredentials);
      }
    }
    if self.max_retries == 0 {
      return Err(Error::Config("max_retries must be at least 1".to_string()));
    }
    if self.concurrency == 0 {
      return Err(Error::Config("concurrency must be at least 1".to_string()));
    }
    Ok(())
  }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
  F: Fn(&str) -> Option<String>,
  T: std::str::FromStr,
{
  match lookup(key) {
    Some(raw) => raw.trim().parse().map_err(|_| Error::Config(format!("Invalid {}", key))),
    None => Ok(default),
  }
}
