//! Per-caller views of a cache entry.

use std::sync::Arc;

use serde_json::Value;

use super::key::CacheKey;
use super::layer::{FetchCache, Fetcher};
use crate::api::ApiError;

/// Lifecycle of a cache entry as seen by a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
  /// No key: fetching was deliberately skipped
  #[default]
  Idle,
  /// Entry exists but nothing has been fetched yet
  Empty,
  /// First fetch in flight, nothing to show yet
  Loading,
  /// Last fetch succeeded
  Ready,
  /// A fetch is in flight while older data or an older error is shown
  Revalidating,
  /// Last fetch failed (older data, if any, is still available)
  Failed,
}

/// Point-in-time projection of a cache entry.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  pub data: Option<Arc<Value>>,
  pub error: Option<ApiError>,
  pub status: FetchStatus,
}

impl Snapshot {
  /// Snapshot for a skipped (`None`) key.
  pub fn idle() -> Self {
    Self::default()
  }

  /// "No data and no error yet". Always false for a skipped key.
  pub fn is_loading(&self) -> bool {
    self.status != FetchStatus::Idle && self.data.is_none() && self.error.is_none()
  }
}

/// A caller's handle on one key of a [`FetchCache`].
///
/// Cheap to clone; clones observe the same entry.
#[derive(Clone)]
pub struct Subscription {
  cache: FetchCache,
  key: Option<CacheKey>,
  fetcher: Fetcher,
}

impl Subscription {
  pub(super) fn new(cache: FetchCache, key: Option<CacheKey>, fetcher: Fetcher) -> Self {
    Self {
      cache,
      key,
      fetcher,
    }
  }

  pub fn key(&self) -> Option<&CacheKey> {
    self.key.as_ref()
  }

  /// Current state without waiting.
  pub fn snapshot(&self) -> Snapshot {
    match &self.key {
      Some(key) => self.cache.snapshot(key),
      None => Snapshot::idle(),
    }
  }

  /// Wait for any in-flight fetch of this key, then return the state.
  pub async fn settled(&self) -> Snapshot {
    match &self.key {
      Some(key) => self.cache.settled(key).await,
      None => Snapshot::idle(),
    }
  }

  /// Start a fetch if the cached value is missing or no longer fresh.
  pub fn revalidate(&self) {
    if let Some(key) = &self.key {
      self.cache.revalidate(key, &self.fetcher);
    }
  }

  /// Discard the current value and refetch.
  ///
  /// Any fetch already in flight for this key is superseded: its result is
  /// dropped. Resolves once the new result (or a later one) is stored.
  pub async fn mutate(&self) -> Snapshot {
    match &self.key {
      Some(key) => {
        self.cache.invalidate(key, &self.fetcher).await;
        self.cache.settled(key).await
      }
      None => Snapshot::idle(),
    }
  }
}

impl std::fmt::Debug for Subscription {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("key", &self.key)
      .finish_non_exhaustive()
  }
}
