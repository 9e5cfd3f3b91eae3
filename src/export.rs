//! CSV export of price list records.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::api::types::{ListEnvelope, PriceList, PriceListRecord};
use crate::api::{ApiError, QueryParams, ResourceClient};
use crate::resources::PRICE_LISTS_PATH;

pub const EXPORT_FILENAME: &str = "price_list_records.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Largest page the platform serves.
const PAGE_SIZE: u32 = 250;

/// Upper bound on pages fetched from one list endpoint.
pub const MAX_PAGES: u32 = 400;

const HEADER: [&str; 8] = [
  "Price List Name",
  "Currency",
  "Product ID",
  "Variant ID",
  "Price",
  "Sale Price",
  "Retail Price",
  "MAP Price",
];

/// A finished export, ready to be saved or served as a download.
#[derive(Debug, Clone)]
pub struct CsvExport {
  pub body: String,
  /// Data rows, excluding the header
  pub rows: usize,
}

impl CsvExport {
  pub fn filename(&self) -> &'static str {
    EXPORT_FILENAME
  }

  pub fn content_type(&self) -> &'static str {
    CSV_CONTENT_TYPE
  }

  pub fn content_disposition(&self) -> String {
    format!("attachment; filename={}", EXPORT_FILENAME)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
  #[error("failed to fetch {what}: {source}")]
  Fetch {
    what: String,
    #[source]
    source: ApiError,
  },

  #[error("failed to write CSV: {0}")]
  Csv(#[from] csv::Error),

  #[error("failed to flush CSV: {0}")]
  Io(#[from] std::io::Error),

  #[error("CSV output is not valid UTF-8: {0}")]
  Encoding(#[from] std::string::FromUtf8Error),
}

impl ExportError {
  /// Status to answer with: the upstream status when there is one, else 500.
  pub fn status(&self) -> u16 {
    match self {
      Self::Fetch { source, .. } => source.status_or_500(),
      _ => 500,
    }
  }

  /// `{"message": ...}` error body.
  pub fn to_json(&self) -> Value {
    json!({ "message": self.to_string() })
  }
}

/// Fetch every price list and every record of each, one row per record.
pub async fn export_price_list_records(
  client: &ResourceClient,
  params: &QueryParams,
) -> Result<CsvExport, ExportError> {
  let price_lists: Vec<PriceList> = fetch_all(client, PRICE_LISTS_PATH, params)
    .await
    .map_err(|source| ExportError::Fetch {
      what: "price lists".to_string(),
      source,
    })?;

  let mut writer = csv::WriterBuilder::new()
    .has_headers(false)
    .from_writer(Vec::new());
  writer.write_record(HEADER)?;

  let mut rows = 0;
  for price_list in &price_lists {
    let path = format!("{}/{}/records", PRICE_LISTS_PATH, price_list.id);
    let records: Vec<PriceListRecord> =
      fetch_all(client, &path, params)
        .await
        .map_err(|source| ExportError::Fetch {
          what: format!("records of price list {}", price_list.id),
          source,
        })?;

    debug!(price_list = price_list.id, records = records.len(), "exporting records");
    for record in &records {
      writer.write_record(record_row(&price_list.name, record))?;
      rows += 1;
    }
  }

  let bytes = writer.into_inner().map_err(|e| e.into_error())?;
  info!(price_lists = price_lists.len(), rows, "price list export finished");

  Ok(CsvExport {
    body: String::from_utf8(bytes)?,
    rows,
  })
}

/// Collect every page of a list endpoint.
///
/// Stops when a page comes back empty, when `meta.pagination` says the last
/// page was reached, or (without pagination metadata) on a short page. An
/// upstream that ignores `page` is cut off when a page repeats the previous
/// one, and no endpoint is read past [`MAX_PAGES`].
pub async fn fetch_all<T: DeserializeOwned>(
  client: &ResourceClient,
  path: &str,
  params: &QueryParams,
) -> Result<Vec<T>, ApiError> {
  let mut all = Vec::new();
  let mut previous: Option<Value> = None;

  for page in 1..=MAX_PAGES {
    let mut page_params = params.clone();
    page_params
      .set("page", page.to_string())
      .set("limit", PAGE_SIZE.to_string());

    let mut body = client.fetch(path, &page_params).await?;
    let envelope = ListEnvelope::<T>::deserialize(&body)?;
    let data = body.get_mut("data").map(Value::take);
    if data.is_some() && data == previous {
      warn!(path, page, "page repeats the previous one, stopping");
      break;
    }

    let count = envelope.data.len();
    all.extend(envelope.data);

    let last_page = match envelope.meta.and_then(|m| m.pagination) {
      Some(p) if p.total_pages > 0 => u64::from(page) >= p.total_pages,
      Some(p) => match p.total {
        Some(total) => all.len() as u64 >= total,
        None => count < PAGE_SIZE as usize,
      },
      None => count < PAGE_SIZE as usize,
    };
    if count == 0 || last_page {
      return Ok(all);
    }
    if page == MAX_PAGES {
      warn!(path, pages = MAX_PAGES, "page limit reached, stopping");
    }
    previous = data;
  }

  Ok(all)
}

fn record_row(price_list_name: &str, record: &PriceListRecord) -> [String; 8] {
  [
    price_list_name.to_string(),
    record.currency.clone(),
    opt(record.product_id),
    opt(record.variant_id),
    opt(record.price),
    opt(record.sale_price),
    opt(record.retail_price),
    opt(record.map_price),
  ]
}

fn opt<T: ToString>(value: Option<T>) -> String {
  value.map(|v| v.to_string()).unwrap_or_default()
}
