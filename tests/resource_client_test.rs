//! Integration tests for [`ResourceClient`] against a mock dashboard API.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use promodash::api::error::DEFAULT_ERROR_MESSAGE;
use promodash::api::{ApiError, QueryParams, ResourceClient};

#[tokio::test]
async fn fetch_returns_parsed_body_and_sends_query() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/coupons"))
    .and(query_param("page", "2"))
    .and(query_param("context", "store-1"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "data": [{ "id": 1, "name": "SPRING" }],
      "meta": { "pagination": { "total": 1 } }
    })))
    .expect(1)
    .mount(&server)
    .await;

  let client = ResourceClient::new(&server.uri()).unwrap();
  let params: QueryParams = [("page", "2"), ("context", "store-1")].into_iter().collect();
  let body = client.fetch("/api/coupons", &params).await.unwrap();

  assert_eq!(body["data"][0]["name"], "SPRING");
  assert_eq!(body["meta"]["pagination"]["total"], 1);
}

#[tokio::test]
async fn error_body_message_is_surfaced_with_status() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/orders/9"))
    .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
    .mount(&server)
    .await;

  let client = ResourceClient::new(&server.uri()).unwrap();
  let err = client
    .fetch("/api/orders/9", &QueryParams::new())
    .await
    .unwrap_err();

  assert_eq!(
    err,
    ApiError::Http {
      status: 404,
      message: "not found".to_string()
    }
  );
  assert!(err.is_not_found());
}

#[tokio::test]
async fn non_json_error_body_gets_default_message() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/products"))
    .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
    .mount(&server)
    .await;

  let client = ResourceClient::new(&server.uri()).unwrap();
  let err = client
    .fetch("/api/products", &QueryParams::new())
    .await
    .unwrap_err();

  assert_eq!(err.status(), Some(502));
  assert_eq!(err.message(), DEFAULT_ERROR_MESSAGE);
}

#[tokio::test]
async fn malformed_success_body_is_an_error() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/products"))
    .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
    .mount(&server)
    .await;

  let client = ResourceClient::new(&server.uri()).unwrap();
  let err = client
    .fetch("/api/products", &QueryParams::new())
    .await
    .unwrap_err();

  assert!(matches!(err, ApiError::Malformed(_)));
}

#[tokio::test]
async fn bearer_token_and_json_body_are_sent() {
  let server = MockServer::start().await;
  Mock::given(method("PATCH"))
    .and(path("/api/coupons/4"))
    .and(header("authorization", "Bearer secret"))
    .and(body_json(json!({ "status": "DISABLED" })))
    .respond_with(ResponseTemplate::new(204))
    .expect(1)
    .mount(&server)
    .await;

  let client = ResourceClient::new(&server.uri())
    .unwrap()
    .with_token("secret");
  let body = client
    .patch(
      "/api/coupons/4",
      &QueryParams::new(),
      &json!({ "status": "DISABLED" }),
    )
    .await
    .unwrap();

  assert!(body.is_null());
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
  // Port 9 (discard) is not listening on test machines
  let client = ResourceClient::new("http://127.0.0.1:9").unwrap();
  let err = client
    .fetch("/api/products", &QueryParams::new())
    .await
    .unwrap_err();

  assert!(matches!(err, ApiError::Transport(_)));
  assert_eq!(err.status_or_500(), 500);
}
