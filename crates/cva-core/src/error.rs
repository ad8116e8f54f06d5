use thiserror::Error;

/// The main error type for cva-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),

  /// Neither a token nor a username/password pair was supplied
  #[error("Missing credentials: either a token or user/password is required")]
  MissingCredentials,

  /// Connection-level failure before any response was received
  #[error("Network error: {0}")]
  Network(String),

  /// 401/403 received before the token was renewed in this call
  #[error("Authorization expired (HTTP {status})")]
  AuthExpired { status: u16 },

  /// 4xx response other than 404, or a second 401/403 in the same call
  #[error("Client error {status}: {body}")]
  Client { status: u16, body: String },

  /// 5xx response
  #[error("Server error {status}: {body}")]
  Server { status: u16, body: String },

  /// Any other non-success status
  #[error("Unexpected HTTP status {status}: {body}")]
  UnexpectedStatus { status: u16, body: String },

  /// The response envelope carried a non-empty `error` field
  #[error("Service error: {0}")]
  Service(String),

  /// 404 on a request that asked for existence semantics
  #[error("Not found: {0}")]
  NotFound(String),

  /// The authentication exchange failed or returned something unusable
  #[error("Authentication failed: {0}")]
  Authentication(String),

  /// Malformed query parameter or identifier
  #[error("Invalid parameter: {0}")]
  InvalidParameter(String),

  /// Serialization/Deserialization error
  #[error("Serialization error: {0}")]
  Serde(#[from] serde_json::Error),

  /// Parse error for response bodies
  #[error("Parse error: {0}")]
  Parse(String),
}

impl Error {
  /// Whether the retry wrapper may re-issue the request after this error.
  ///
  /// Network failures, server failures and a first authorization expiry are
  /// transient. Everything else aborts the call.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Error::Network(_) | Error::Server { .. } | Error::AuthExpired { .. })
  }

  /// HTTP status carried by the error, if any
  pub fn status(&self) -> Option<u16> {
    match self {
      Error::AuthExpired { status }
      | Error::Client { status, .. }
      | Error::Server { status, .. }
      | Error::UnexpectedStatus { status, .. } => Some(*status),
      _ => None,
    }
  }
}

/// Result type alias for cva-* crates
pub type Result<T> = std::result::Result<T, Error>;
