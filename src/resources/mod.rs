//! Typed accessors, one per resource family.
//!
//! Each accessor builds a cache key from a fixed path, an optional id, the
//! caller's list options and the session's context token. Without a context
//! token (or when the caller already holds the item) the key is `None` and
//! nothing is fetched.

mod options;
mod session;
mod state;

pub use options::{ListOptions, SortDirection};
pub use session::Session;
pub use state::{ItemQuery, ItemState, ListQuery, ListState};

use serde_json::{json, Value};
use tracing::info;

use crate::api::types::{
  CatalogSummary, ListItem, Order, PriceList, Promotion, ShippingAndProductsInfo,
};
use crate::api::{delete_sequential, ApiError, BatchDeleteError, QueryParams, ResourceClient};
use crate::cache::{CacheKey, FetchCache, Fetcher};
use crate::export::{export_price_list_records, CsvExport, ExportError};

pub const PRODUCTS_PATH: &str = "/api/products";
pub const PRODUCT_LIST_PATH: &str = "/api/products/list";
pub const PROMOTIONS_PATH: &str = "/api/coupons";
pub const PRICE_LISTS_PATH: &str = "/api/price-lists";
pub const ORDERS_PATH: &str = "/api/orders";

/// Entry point for views: accessors over a shared client, cache and session.
#[derive(Clone)]
pub struct Resources {
  client: ResourceClient,
  cache: FetchCache,
  session: Session,
}

impl Resources {
  pub fn new(client: ResourceClient, cache: FetchCache, session: Session) -> Self {
    Self {
      client,
      cache,
      session,
    }
  }

  pub fn client(&self) -> &ResourceClient {
    &self.client
  }

  pub fn cache(&self) -> &FetchCache {
    &self.cache
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  /// Catalog summary.
  pub fn products(&self) -> ItemQuery<CatalogSummary> {
    let key = self.key(PRODUCTS_PATH.to_string(), QueryParams::new());
    ItemQuery::new(self.subscribe(key))
  }

  /// Promotions table, paged and sorted.
  pub fn promotion_list(&self, options: &ListOptions) -> ListQuery<Promotion> {
    let key = self.key(PROMOTIONS_PATH.to_string(), options.to_params());
    ListQuery::new(self.subscribe(key))
  }

  pub fn product_list(&self, options: &ListOptions) -> ListQuery<ListItem> {
    let key = self.key(PRODUCT_LIST_PATH.to_string(), options.to_params());
    ListQuery::new(self.subscribe(key))
  }

  /// Single product. Served from `list` without a request when it is there
  /// already; fetched otherwise (e.g. when opened by direct link).
  pub fn product_info(&self, pid: u64, list: Option<&[ListItem]>) -> ItemQuery<ListItem> {
    let known = list.and_then(|items| items.iter().find(|item| item.id == pid));
    match known {
      Some(item) => ItemQuery::known(self.subscribe(None), item.clone()),
      None => {
        let key = self.key(format!("{}/{}", PRODUCTS_PATH, pid), QueryParams::new());
        ItemQuery::new(self.subscribe(key))
      }
    }
  }

  pub fn order(&self, order_id: Option<u64>) -> ItemQuery<Order> {
    let key = order_id
      .and_then(|id| self.key(format!("{}/{}", ORDERS_PATH, id), QueryParams::new()));
    ItemQuery::new(self.subscribe(key))
  }

  /// Shipping addresses and line items, which the order body doesn't carry.
  pub fn shipping_and_products_info(
    &self,
    order_id: Option<u64>,
  ) -> ItemQuery<ShippingAndProductsInfo> {
    let key = order_id.and_then(|id| {
      self.key(
        format!("{}/{}/shipping_products", ORDERS_PATH, id),
        QueryParams::new(),
      )
    });
    ItemQuery::new(self.subscribe(key))
  }

  pub fn price_lists(&self, options: &ListOptions) -> ListQuery<PriceList> {
    let key = self.key(PRICE_LISTS_PATH.to_string(), options.to_params());
    ListQuery::new(self.subscribe(key))
  }

  pub fn price_list(&self, id: Option<u64>) -> ItemQuery<PriceList> {
    let key = id.and_then(|id| self.key(format!("{}/{}", PRICE_LISTS_PATH, id), QueryParams::new()));
    ItemQuery::new(self.subscribe(key))
  }

  // ==========================================================================
  // Writes (not cached; callers mutate the affected list afterwards)
  // ==========================================================================

  /// Delete promotions one by one, stopping at the first failure.
  pub async fn delete_promotions(&self, ids: &[u64]) -> Result<Vec<u64>, BatchDeleteError> {
    delete_sequential(&self.client, ids, &self.context_params(), |id| {
      format!("{}/{}", PROMOTIONS_PATH, id)
    })
    .await
  }

  pub async fn set_promotion_status(&self, id: u64, status: &str) -> Result<(), ApiError> {
    info!(id, status, "updating promotion status");
    self
      .client
      .patch(
        &format!("{}/{}", PROMOTIONS_PATH, id),
        &self.context_params(),
        &json!({ "status": status }),
      )
      .await?;
    Ok(())
  }

  pub async fn create_price_list(&self, body: &Value) -> Result<Value, ApiError> {
    self
      .client
      .post(PRICE_LISTS_PATH, &self.context_params(), body)
      .await
  }

  pub async fn update_price_list(&self, id: u64, body: &Value) -> Result<Value, ApiError> {
    self
      .client
      .put(
        &format!("{}/{}", PRICE_LISTS_PATH, id),
        &self.context_params(),
        body,
      )
      .await
  }

  pub async fn delete_price_lists(&self, ids: &[u64]) -> Result<Vec<u64>, BatchDeleteError> {
    delete_sequential(&self.client, ids, &self.context_params(), |id| {
      format!("{}/{}", PRICE_LISTS_PATH, id)
    })
    .await
  }

  /// CSV of every record of every price list in the session's store.
  pub async fn export_price_lists(&self) -> Result<CsvExport, ExportError> {
    export_price_list_records(&self.client, &self.context_params()).await
  }

  /// Key for `path`, or `None` while the context token is unknown.
  fn key(&self, path: String, mut params: QueryParams) -> Option<CacheKey> {
    let context = self.session.context()?;
    params.set("context", context);
    Some(CacheKey::new(path, &params))
  }

  fn context_params(&self) -> QueryParams {
    let mut params = QueryParams::new();
    params.set_opt("context", self.session.context());
    params
  }

  fn subscribe(&self, key: Option<CacheKey>) -> crate::cache::Subscription {
    self.cache.subscribe(key, self.fetcher())
  }

  fn fetcher(&self) -> Fetcher {
    let client = self.client.clone();
    Fetcher::new(move |key: CacheKey| {
      let client = client.clone();
      async move { client.fetch_raw(key.path(), key.query()).await }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::FetchStatus;

  fn resources(context: Option<&str>) -> Resources {
    // Nothing listens here: any request would fail with a transport error.
    let client = ResourceClient::new("http://127.0.0.1:9").unwrap();
    Resources::new(
      client,
      FetchCache::new(),
      Session::new(context.map(String::from)),
    )
  }

  #[tokio::test]
  async fn test_missing_context_skips_every_accessor() {
    let res = resources(None);

    let promos = res.promotion_list(&ListOptions::new().page(1));
    assert!(promos.subscription().key().is_none());
    let state = promos.load().await;
    assert!(!state.is_loading);
    assert!(state.list.is_empty());
    assert_eq!(state.status, FetchStatus::Idle);

    assert!(res.price_lists(&ListOptions::new()).subscription().key().is_none());
    assert!(res.products().subscription().key().is_none());
    assert!(res.order(Some(1)).subscription().key().is_none());
    assert!(res.cache().is_empty());
  }

  #[tokio::test]
  async fn test_order_without_id_is_skipped() {
    let res = resources(Some("stores/abc"));
    let order = res.order(None);
    assert!(order.subscription().key().is_none());
    assert!(!order.current().is_loading);
    let info = res.shipping_and_products_info(None);
    assert!(info.subscription().key().is_none());
  }

  #[tokio::test]
  async fn test_keys_include_options_and_context() {
    let res = resources(Some("stores/abc"));
    let promos = res.promotion_list(&ListOptions::new().page(2).limit(10));
    let key = promos.subscription().key().unwrap();
    assert_eq!(key.path(), PROMOTIONS_PATH);
    assert_eq!(key.query(), "page=2&limit=10&context=stores%2Fabc");

    let shipping = res.shipping_and_products_info(Some(42));
    assert_eq!(
      shipping.subscription().key().unwrap().path(),
      "/api/orders/42/shipping_products"
    );
  }

  #[tokio::test]
  async fn test_product_in_list_is_not_fetched() {
    let res = resources(Some("stores/abc"));
    let list = vec![
      ListItem {
        id: 1,
        name: "Mug".to_string(),
        ..Default::default()
      },
      ListItem {
        id: 2,
        name: "Shirt".to_string(),
        ..Default::default()
      },
    ];

    let info = res.product_info(2, Some(&list));
    assert!(info.subscription().key().is_none());
    let state = info.current();
    assert!(!state.is_loading);
    assert_eq!(state.item.unwrap().name, "Shirt");
    assert!(res.cache().is_empty());

    let missing = res.product_info(3, Some(&list));
    assert_eq!(
      missing.subscription().key().unwrap().path(),
      "/api/products/3"
    );
  }
}
