//! Resource accessors over the fetch cache (envelopes, dedup, mutate and
//! context gating) and the price list writes, against a mock dashboard API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use promodash::api::types::ListItem;
use promodash::api::ResourceClient;
use promodash::cache::{FetchCache, FetchStatus};
use promodash::resources::{ListOptions, Resources, Session, SortDirection};

const CONTEXT: &str = "store-1";

fn resources(server: &MockServer, context: Option<&str>) -> Resources {
  let client = ResourceClient::new(&server.uri()).unwrap();
  let cache = FetchCache::new().with_dedupe_interval(Duration::from_secs(60));
  Resources::new(client, cache, Session::new(context.map(str::to_string)))
}

fn promotions_body() -> serde_json::Value {
  json!({
    "data": [{
      "id": 7,
      "name": "Spring sale",
      "code": "SPRING",
      "redemption_type": "AUTOMATIC",
      "current_uses": 3,
      "max_uses": null,
      "start_date": "2024-03-01T00:00:00Z",
      "status": "ENABLED"
    }],
    "meta": { "pagination": { "total": 1, "total_pages": 1 } }
  })
}

#[tokio::test]
async fn list_accessor_projects_envelope() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/coupons"))
    .and(query_param("context", CONTEXT))
    .and(query_param("page", "1"))
    .and(query_param("limit", "10"))
    .and(query_param("sort", "name"))
    .and(query_param("direction", "desc"))
    .respond_with(ResponseTemplate::new(200).set_body_json(promotions_body()))
    .expect(1)
    .mount(&server)
    .await;

  let resources = resources(&server, Some(CONTEXT));
  let options = ListOptions::new()
    .page(1)
    .limit(10)
    .sort("name", SortDirection::Desc);
  let state = resources.promotion_list(&options).load().await;

  assert!(state.error.is_none());
  assert!(!state.is_loading);
  assert_eq!(state.status, FetchStatus::Ready);
  assert_eq!(state.total(), 1);
  assert_eq!(state.list.len(), 1);
  assert_eq!(state.list[0].uses_label(), "3 / ∞");
  assert!(state.list[0].is_enabled());
}

#[tokio::test]
async fn missing_data_field_is_an_empty_list() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/price-lists"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "meta": {} })))
    .mount(&server)
    .await;

  let resources = resources(&server, Some(CONTEXT));
  let state = resources.price_lists(&ListOptions::new()).load().await;

  assert!(state.error.is_none());
  assert!(state.list.is_empty());
  assert_eq!(state.total(), 0);
}

#[tokio::test]
async fn concurrent_subscribers_share_one_request() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/coupons"))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_json(promotions_body())
        .set_delay(Duration::from_millis(100)),
    )
    .expect(1)
    .mount(&server)
    .await;

  let resources = resources(&server, Some(CONTEXT));
  let options = ListOptions::new().page(1);
  let first = resources.promotion_list(&options);
  let second = resources.promotion_list(&options);

  let (a, b) = tokio::join!(first.load(), second.load());
  assert_eq!(a.list, b.list);
  assert_eq!(a.list[0].id, 7);
}

#[tokio::test]
async fn revisit_within_dedupe_interval_serves_cache() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/coupons"))
    .respond_with(ResponseTemplate::new(200).set_body_json(promotions_body()))
    .expect(1)
    .mount(&server)
    .await;

  let resources = resources(&server, Some(CONTEXT));
  resources.promotion_list(&ListOptions::new()).load().await;

  let revisit = resources.promotion_list(&ListOptions::new());
  let state = revisit.current();
  assert_eq!(state.status, FetchStatus::Ready);
  assert_eq!(state.list.len(), 1);
}

#[tokio::test]
async fn mutate_issues_exactly_one_new_request() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/price-lists"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "data": [{ "id": 1, "name": "Wholesale", "active": true }]
    })))
    .expect(2)
    .mount(&server)
    .await;

  let resources = resources(&server, Some(CONTEXT));
  let query = resources.price_lists(&ListOptions::new());
  query.load().await;

  let refreshed = query.mutate().await;
  assert_eq!(refreshed.status, FetchStatus::Ready);
  assert_eq!(refreshed.list[0].name, "Wholesale");
}

#[tokio::test]
async fn without_context_nothing_is_fetched() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(200).set_body_json(promotions_body()))
    .expect(0)
    .mount(&server)
    .await;

  let resources = resources(&server, None);
  let state = resources.promotion_list(&ListOptions::new()).load().await;

  assert_eq!(state.status, FetchStatus::Idle);
  assert!(!state.is_loading);
  assert!(state.list.is_empty());
  assert!(state.error.is_none());
}

#[tokio::test]
async fn failed_fetch_surfaces_error_state() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/orders/5"))
    .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
    .mount(&server)
    .await;

  let resources = resources(&server, Some(CONTEXT));
  let state = resources.order(Some(5)).load().await;

  assert_eq!(state.status, FetchStatus::Failed);
  assert!(state.item.is_none());
  assert!(!state.is_loading);
  let err = state.error.unwrap();
  assert_eq!(err.status(), Some(404));
  assert_eq!(err.message(), "not found");
}

#[tokio::test]
async fn item_accessor_accepts_wrapped_and_bare_bodies() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/price-lists/3"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "data": { "id": 3, "name": "Retail", "active": false }
    })))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/api/price-lists/4"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "id": 4, "name": "Outlet", "active": true
    })))
    .mount(&server)
    .await;

  let resources = resources(&server, Some(CONTEXT));
  let wrapped = resources.price_list(Some(3)).load().await;
  let bare = resources.price_list(Some(4)).load().await;

  assert_eq!(wrapped.item.unwrap().name, "Retail");
  assert_eq!(bare.item.unwrap().name, "Outlet");
}

#[tokio::test]
async fn known_product_is_not_refetched() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/products/11"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 11, "name": "Mug" })))
    .expect(1)
    .mount(&server)
    .await;

  let resources = resources(&server, Some(CONTEXT));
  let list = vec![ListItem {
    id: 10,
    name: "Cap".to_string(),
    ..Default::default()
  }];

  let known = resources.product_info(10, Some(&list)).load().await;
  assert_eq!(known.item.unwrap().name, "Cap");

  let fetched = resources.product_info(11, Some(&list)).load().await;
  assert_eq!(fetched.item.unwrap().name, "Mug");
}

#[tokio::test]
async fn order_accessors_skip_missing_id() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
    .expect(0)
    .mount(&server)
    .await;

  let resources = resources(&server, Some(CONTEXT));
  let order = resources.order(None).load().await;
  let shipping = resources.shipping_and_products_info(None).load().await;

  assert_eq!(order.status, FetchStatus::Idle);
  assert!(order.item.is_none());
  assert_eq!(shipping.status, FetchStatus::Idle);
}

#[tokio::test]
async fn product_list_sends_options_and_context() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/products/list"))
    .and(query_param("context", CONTEXT))
    .and(query_param("page", "2"))
    .and(query_param("limit", "20"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "data": [{ "id": 11, "name": "Mug" }, { "id": 12, "name": "Cap" }],
      "meta": { "pagination": { "count": 2 } }
    })))
    .expect(1)
    .mount(&server)
    .await;

  let resources = resources(&server, Some(CONTEXT));
  let state = resources
    .product_list(&ListOptions::new().page(2).limit(20))
    .load()
    .await;

  assert_eq!(state.status, FetchStatus::Ready);
  let names: Vec<&str> = state.list.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["Mug", "Cap"]);
  // No total in the pagination block: the page length stands in.
  assert_eq!(state.total(), 2);
}

#[tokio::test]
async fn create_price_list_posts_body_with_context() {
  let server = MockServer::start().await;
  let body = json!({ "name": "Wholesale", "active": true });
  Mock::given(method("POST"))
    .and(path("/api/price-lists"))
    .and(query_param("context", CONTEXT))
    .and(body_json(&body))
    .respond_with(ResponseTemplate::new(201).set_body_json(json!({
      "data": { "id": 9, "name": "Wholesale", "active": true }
    })))
    .expect(1)
    .mount(&server)
    .await;

  let created = resources(&server, Some(CONTEXT))
    .create_price_list(&body)
    .await
    .unwrap();

  assert_eq!(created["data"]["id"], 9);
}

#[tokio::test]
async fn update_price_list_puts_body_to_item_path() {
  let server = MockServer::start().await;
  let body = json!({ "name": "Wholesale", "active": false });
  Mock::given(method("PUT"))
    .and(path("/api/price-lists/9"))
    .and(query_param("context", CONTEXT))
    .and(body_json(&body))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "data": { "id": 9, "name": "Wholesale", "active": false }
    })))
    .expect(1)
    .mount(&server)
    .await;

  let updated = resources(&server, Some(CONTEXT))
    .update_price_list(9, &body)
    .await
    .unwrap();

  assert_eq!(updated["data"]["active"], false);
}

#[tokio::test]
async fn rejected_price_list_write_surfaces_message() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/api/price-lists"))
    .respond_with(
      ResponseTemplate::new(422).set_body_json(json!({ "message": "name is already taken" })),
    )
    .mount(&server)
    .await;

  let err = resources(&server, Some(CONTEXT))
    .create_price_list(&json!({ "name": "Wholesale" }))
    .await
    .unwrap_err();

  assert_eq!(err.status(), Some(422));
  assert_eq!(err.message(), "name is already taken");
}
