//! Serde types for the dashboard API's JSON bodies.
//!
//! Every list endpoint wraps its payload in the same `{data, meta}` envelope.
//! Resource structs are lenient: unknown fields are ignored and most fields
//! default, since the upstream platform omits nulls freely.

use serde::{Deserialize, Serialize};

// ============================================================================
// Envelope
// ============================================================================

/// `{data: [...], meta?: {...}}` as returned by list endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListEnvelope<T> {
  /// Absent or `null` `data` deserializes to an empty list.
  #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
  pub data: Vec<T>,
  #[serde(default)]
  pub meta: Option<Meta>,
}

/// Single-item body: either `{data: {...}}` or the bare object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ItemBody<T> {
  Wrapped { data: T },
  Bare(T),
}

impl<T> ItemBody<T> {
  pub fn into_inner(self) -> T {
    match self {
      Self::Wrapped { data } => data,
      Self::Bare(item) => item,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
  #[serde(default)]
  pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
  /// `None` when the upstream leaves it out, which is not the same as zero.
  #[serde(default)]
  pub total: Option<u64>,
  #[serde(default)]
  pub count: u64,
  #[serde(default)]
  pub per_page: u64,
  #[serde(default)]
  pub current_page: u64,
  #[serde(default)]
  pub total_pages: u64,
}

impl Meta {
  pub fn total(&self) -> Option<u64> {
    self.pagination.as_ref().and_then(|p| p.total)
  }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Promotions
// ============================================================================

/// Row of the promotions table (`/api/coupons`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Promotion {
  pub id: u64,
  pub name: String,
  pub code: Option<String>,
  pub redemption_type: String,
  pub current_uses: u64,
  pub max_uses: Option<u64>,
  pub start_date: String,
  pub end_date: Option<String>,
  pub status: String,
}

pub const STATUS_ENABLED: &str = "ENABLED";
pub const STATUS_DISABLED: &str = "DISABLED";

impl Promotion {
  pub fn is_enabled(&self) -> bool {
    self.status == STATUS_ENABLED
  }

  /// Status to send when the row's switch is flipped.
  pub fn toggled_status(&self) -> &'static str {
    if self.is_enabled() {
      STATUS_DISABLED
    } else {
      STATUS_ENABLED
    }
  }

  /// `current / max`, with `∞` when uses are unlimited.
  pub fn uses_label(&self) -> String {
    match self.max_uses {
      Some(max) => format!("{} / {}", self.current_uses, max),
      None => format!("{} / ∞", self.current_uses),
    }
  }
}

// ============================================================================
// Price lists
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceList {
  pub id: u64,
  pub name: String,
  pub active: bool,
  pub date_created: Option<String>,
  pub date_modified: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceListRecord {
  pub price_list_id: Option<u64>,
  pub currency: String,
  pub product_id: Option<u64>,
  pub variant_id: Option<u64>,
  pub price: Option<f64>,
  pub sale_price: Option<f64>,
  pub retail_price: Option<f64>,
  pub map_price: Option<f64>,
}

// ============================================================================
// Products and orders
// ============================================================================

/// Catalog overview from `/api/products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSummary {
  pub inventory_count: u64,
  pub variant_count: u64,
  pub primary_category_name: Option<String>,
}

/// Product row as returned by `/api/products/list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListItem {
  pub id: u64,
  pub name: String,
  pub price: Option<f64>,
  pub stock: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
  pub id: u64,
  pub status: String,
  pub date_created: Option<String>,
  pub total_inc_tax: Option<String>,
  pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingAddress {
  pub id: u64,
  pub first_name: String,
  pub last_name: String,
  pub street_1: String,
  pub city: String,
  pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderProduct {
  pub id: u64,
  pub name: String,
  pub quantity: u64,
  pub price_inc_tax: Option<String>,
}

/// Shipping addresses and line items of an order, fetched separately from
/// the order itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingAndProductsInfo {
  pub shipping_addresses: Vec<ShippingAddress>,
  pub products: Vec<OrderProduct>,
}
