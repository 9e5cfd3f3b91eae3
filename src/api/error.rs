//! Errors raised by the resource client.

/// Message used when an error response carries no `message` of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred while fetching the data.";

/// Failure of a single request against the dashboard API.
///
/// Cloneable so a failure can be stored in the fetch cache and handed to
/// every subscriber of the same key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
  /// No response was received (connection refused, DNS, TLS, ...).
  #[error("transport error: {0}")]
  Transport(String),

  /// The server answered outside 200-299.
  #[error("HTTP {status}: {message}")]
  Http { status: u16, message: String },

  /// The body could not be parsed or lacks the expected shape.
  #[error("malformed response: {0}")]
  Malformed(String),
}

impl ApiError {
  /// Status code of an HTTP failure, if the server answered at all.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Http { status, .. } => Some(*status),
      _ => None,
    }
  }

  /// Status to forward to a caller of a proxy-style endpoint.
  pub fn status_or_500(&self) -> u16 {
    self.status().unwrap_or(500)
  }

  /// Human-readable message without the variant prefix.
  pub fn message(&self) -> &str {
    match self {
      Self::Transport(m) | Self::Malformed(m) => m,
      Self::Http { message, .. } => message,
    }
  }

  pub fn is_not_found(&self) -> bool {
    self.status() == Some(404)
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      Self::Malformed(e.to_string())
    } else {
      Self::Transport(e.to_string())
    }
  }
}

impl From<serde_json::Error> for ApiError {
  fn from(e: serde_json::Error) -> Self {
    Self::Malformed(e.to_string())
  }
}
