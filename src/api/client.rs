use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::error::{ApiError, DEFAULT_ERROR_MESSAGE};
use super::params::QueryParams;

/// HTTP client for the dashboard API.
///
/// Every call is a single request: no retries, and no timeout unless one was
/// configured with [`ResourceClient::with_timeout`].
#[derive(Clone, Debug)]
pub struct ResourceClient {
  http: reqwest::Client,
  base_url: Url,
  token: Option<String>,
}

/// Error body shape: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  message: Option<String>,
}

impl ResourceClient {
  pub fn new(base_url: &str) -> Result<Self, ApiError> {
    let base_url = Url::parse(base_url)
      .map_err(|e| ApiError::Transport(format!("invalid base URL {}: {}", base_url, e)))?;

    Ok(Self {
      http: reqwest::Client::new(),
      base_url,
      token: None,
    })
  }

  /// Attach `Authorization: Bearer <token>` to every request.
  pub fn with_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ApiError> {
    self.http = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {}", e)))?;
    Ok(self)
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// GET `path?params` and return the parsed JSON body.
  pub async fn fetch(&self, path: &str, params: &QueryParams) -> Result<Value, ApiError> {
    self.fetch_raw(path, &params.serialize()).await
  }

  /// GET with an already-serialized query string.
  pub async fn fetch_raw(&self, path: &str, query: &str) -> Result<Value, ApiError> {
    self.send(Method::GET, path, query, None).await
  }

  pub async fn delete(&self, path: &str, params: &QueryParams) -> Result<Value, ApiError> {
    self
      .send(Method::DELETE, path, &params.serialize(), None)
      .await
  }

  pub async fn patch(
    &self,
    path: &str,
    params: &QueryParams,
    body: &Value,
  ) -> Result<Value, ApiError> {
    self
      .send(Method::PATCH, path, &params.serialize(), Some(body))
      .await
  }

  pub async fn put(&self, path: &str, params: &QueryParams, body: &Value) -> Result<Value, ApiError> {
    self
      .send(Method::PUT, path, &params.serialize(), Some(body))
      .await
  }

  pub async fn post(
    &self,
    path: &str,
    params: &QueryParams,
    body: &Value,
  ) -> Result<Value, ApiError> {
    self
      .send(Method::POST, path, &params.serialize(), Some(body))
      .await
  }

  /// Resolve `path` against the base URL and attach the query string.
  pub fn url(&self, path: &str, query: &str) -> Result<Url, ApiError> {
    let joined = format!(
      "{}/{}",
      self.base_url.as_str().trim_end_matches('/'),
      path.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined)
      .map_err(|e| ApiError::Transport(format!("invalid request URL {}: {}", joined, e)))?;
    if !query.is_empty() {
      url.set_query(Some(query));
    }
    Ok(url)
  }

  async fn send(
    &self,
    method: Method,
    path: &str,
    query: &str,
    body: Option<&Value>,
  ) -> Result<Value, ApiError> {
    let url = self.url(path, query)?;
    debug!(%method, %url, "sending request");

    let mut request = self.http.request(method.clone(), url.clone());
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }
    if let Some(body) = body {
      request = request.json(body);
    }

    let response = request
      .send()
      .await
      .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status();
    let bytes = response
      .bytes()
      .await
      .map_err(|e| ApiError::Transport(e.to_string()))?;

    if !status.is_success() {
      let message = error_message(&bytes);
      warn!(%method, %url, status = status.as_u16(), %message, "request failed");
      return Err(ApiError::Http {
        status: status.as_u16(),
        message,
      });
    }

    if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
      return Ok(Value::Null);
    }

    serde_json::from_slice(&bytes).map_err(ApiError::from)
  }
}

/// Best-effort `message` from an error body, falling back to a generic one.
fn error_message(body: &[u8]) -> String {
  serde_json::from_slice::<ErrorBody>(body)
    .ok()
    .and_then(|b| b.message)
    .filter(|m| !m.is_empty())
    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_url_joins_path_and_query() {
    let client = ResourceClient::new("http://localhost:3000/").unwrap();
    let url = client.url("/api/coupons", "page=1&limit=10").unwrap();
    assert_eq!(
      url.as_str(),
      "http://localhost:3000/api/coupons?page=1&limit=10"
    );
  }

  #[test]
  fn test_url_without_query_has_no_question_mark() {
    let client = ResourceClient::new("http://localhost:3000").unwrap();
    let url = client.url("api/price-lists", "").unwrap();
    assert_eq!(url.as_str(), "http://localhost:3000/api/price-lists");
  }

  #[test]
  fn test_url_keeps_base_path_prefix() {
    let client = ResourceClient::new("https://admin.example.com/dashboard").unwrap();
    let url = client.url("/api/orders/5", "context=abc").unwrap();
    assert_eq!(
      url.as_str(),
      "https://admin.example.com/dashboard/api/orders/5?context=abc"
    );
  }

  #[test]
  fn test_invalid_base_url() {
    assert!(matches!(
      ResourceClient::new("not a url"),
      Err(ApiError::Transport(_))
    ));
  }

  #[test]
  fn test_error_message_fallbacks() {
    assert_eq!(error_message(br#"{"message":"not found"}"#), "not found");
    assert_eq!(error_message(br#"{"message":""}"#), DEFAULT_ERROR_MESSAGE);
    assert_eq!(error_message(br#"{"error":"x"}"#), DEFAULT_ERROR_MESSAGE);
    assert_eq!(error_message(b"<html>oops</html>"), DEFAULT_ERROR_MESSAGE);
  }
}
