//! Typed projections of cache snapshots.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::api::types::{ItemBody, ListEnvelope, Meta};
use crate::api::ApiError;
use crate::cache::{FetchStatus, Snapshot, Subscription};

/// What a list view renders.
#[derive(Debug, Clone)]
pub struct ListState<T> {
  /// Never absent: a missing `data` field becomes an empty list
  pub list: Vec<T>,
  pub meta: Option<Meta>,
  pub error: Option<ApiError>,
  /// No data and no error yet
  pub is_loading: bool,
  pub status: FetchStatus,
}

impl<T> ListState<T> {
  /// Item count for pagination: `meta.pagination.total` when present.
  pub fn total(&self) -> u64 {
    self
      .meta
      .as_ref()
      .and_then(Meta::total)
      .unwrap_or(self.list.len() as u64)
  }
}

/// What a detail view renders.
#[derive(Debug, Clone)]
pub struct ItemState<T> {
  pub item: Option<T>,
  pub error: Option<ApiError>,
  pub is_loading: bool,
  pub status: FetchStatus,
}

fn project_list<T: DeserializeOwned>(snapshot: Snapshot) -> ListState<T> {
  let mut error = snapshot.error;
  let (list, meta) = match snapshot.data.as_deref() {
    None | Some(Value::Null) => (Vec::new(), None),
    Some(value) => match ListEnvelope::<T>::deserialize(value) {
      Ok(envelope) => (envelope.data, envelope.meta),
      Err(e) => {
        error.get_or_insert(ApiError::Malformed(e.to_string()));
        (Vec::new(), None)
      }
    },
  };

  ListState {
    list,
    meta,
    is_loading: snapshot.status != FetchStatus::Idle
      && snapshot.data.is_none()
      && error.is_none(),
    error,
    status: snapshot.status,
  }
}

fn project_item<T: DeserializeOwned>(snapshot: Snapshot) -> ItemState<T> {
  let mut error = snapshot.error;
  let item = match snapshot.data.as_deref() {
    None | Some(Value::Null) => None,
    Some(value) => match ItemBody::<T>::deserialize(value) {
      Ok(body) => Some(body.into_inner()),
      Err(e) => {
        error.get_or_insert(ApiError::Malformed(e.to_string()));
        None
      }
    },
  };

  ItemState {
    item,
    is_loading: snapshot.status != FetchStatus::Idle
      && snapshot.data.is_none()
      && error.is_none(),
    error,
    status: snapshot.status,
  }
}

/// Typed handle on a list subscription.
pub struct ListQuery<T> {
  subscription: Subscription,
  _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> ListQuery<T> {
  pub(super) fn new(subscription: Subscription) -> Self {
    Self {
      subscription,
      _marker: PhantomData,
    }
  }

  /// State right now, without waiting for the network.
  pub fn current(&self) -> ListState<T> {
    project_list(self.subscription.snapshot())
  }

  /// State once the in-flight fetch (if any) has completed.
  pub async fn load(&self) -> ListState<T> {
    project_list(self.subscription.settled().await)
  }

  /// Refetch after a write and return the refreshed state.
  pub async fn mutate(&self) -> ListState<T> {
    project_list(self.subscription.mutate().await)
  }

  pub fn subscription(&self) -> &Subscription {
    &self.subscription
  }
}

impl<T> Clone for ListQuery<T> {
  fn clone(&self) -> Self {
    Self {
      subscription: self.subscription.clone(),
      _marker: PhantomData,
    }
  }
}

/// Typed handle on a single-item subscription.
///
/// An item already known to the caller (e.g. found in a loaded list) is
/// served as-is and never fetched.
pub struct ItemQuery<T> {
  subscription: Subscription,
  known: Option<T>,
}

impl<T: DeserializeOwned + Clone> ItemQuery<T> {
  pub(super) fn new(subscription: Subscription) -> Self {
    Self {
      subscription,
      known: None,
    }
  }

  pub(super) fn known(subscription: Subscription, item: T) -> Self {
    Self {
      subscription,
      known: Some(item),
    }
  }

  pub fn current(&self) -> ItemState<T> {
    self.resolve(|| self.subscription.snapshot())
  }

  pub async fn load(&self) -> ItemState<T> {
    if let Some(item) = &self.known {
      return known_state(item.clone());
    }
    project_item(self.subscription.settled().await)
  }

  pub async fn mutate(&self) -> ItemState<T> {
    if let Some(item) = &self.known {
      return known_state(item.clone());
    }
    project_item(self.subscription.mutate().await)
  }

  pub fn subscription(&self) -> &Subscription {
    &self.subscription
  }

  fn resolve(&self, snapshot: impl FnOnce() -> Snapshot) -> ItemState<T> {
    match &self.known {
      Some(item) => known_state(item.clone()),
      None => project_item(snapshot()),
    }
  }
}

impl<T: Clone> Clone for ItemQuery<T> {
  fn clone(&self) -> Self {
    Self {
      subscription: self.subscription.clone(),
      known: self.known.clone(),
    }
  }
}

fn known_state<T>(item: T) -> ItemState<T> {
  ItemState {
    item: Some(item),
    error: None,
    is_loading: false,
    status: FetchStatus::Idle,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::Promotion;
  use serde_json::json;
  use std::sync::Arc;

  fn ready(value: Value) -> Snapshot {
    Snapshot {
      data: Some(Arc::new(value)),
      error: None,
      status: FetchStatus::Ready,
    }
  }

  #[test]
  fn test_list_unwraps_envelope() {
    let state: ListState<Promotion> = project_list(ready(json!({
      "data": [{"id": 1, "name": "Spring sale"}],
      "meta": {"pagination": {"total": 1}}
    })));
    assert_eq!(state.list.len(), 1);
    assert_eq!(state.list[0].id, 1);
    assert_eq!(state.total(), 1);
    assert!(!state.is_loading);
  }

  #[test]
  fn test_total_falls_back_to_list_length() {
    let state: ListState<Promotion> =
      project_list(ready(json!({"data": [{"id": 1}, {"id": 2}]})));
    assert_eq!(state.total(), 2);

    let state: ListState<Promotion> = project_list(ready(json!({
      "data": [{"id": 1}, {"id": 2}],
      "meta": {"pagination": {"count": 2}}
    })));
    assert_eq!(state.total(), 2);
  }

  #[test]
  fn test_missing_data_is_empty_list() {
    let state: ListState<Promotion> = project_list(ready(json!({"meta": {}})));
    assert!(state.list.is_empty());
    assert!(state.error.is_none());

    let state: ListState<Promotion> = project_list(ready(Value::Null));
    assert!(state.list.is_empty());
  }

  #[test]
  fn test_loading_before_first_result() {
    let state: ListState<Promotion> = project_list(Snapshot {
      data: None,
      error: None,
      status: FetchStatus::Loading,
    });
    assert!(state.is_loading);
    assert!(state.list.is_empty());
  }

  #[test]
  fn test_idle_is_not_loading() {
    let state: ListState<Promotion> = project_list(Snapshot::idle());
    assert!(!state.is_loading);
    let item: ItemState<Promotion> = project_item(Snapshot::idle());
    assert!(!item.is_loading);
    assert!(item.item.is_none());
  }

  #[test]
  fn test_error_ends_loading() {
    let state: ListState<Promotion> = project_list(Snapshot {
      data: None,
      error: Some(ApiError::Http {
        status: 404,
        message: "not found".to_string(),
      }),
      status: FetchStatus::Failed,
    });
    assert!(!state.is_loading);
    assert_eq!(state.error.unwrap().status(), Some(404));
  }

  #[test]
  fn test_wrong_shape_is_malformed() {
    let state: ListState<Promotion> = project_list(ready(json!({"data": "oops"})));
    assert!(matches!(state.error, Some(ApiError::Malformed(_))));
    assert!(state.list.is_empty());
  }

  #[test]
  fn test_item_unwraps_data() {
    let state: ItemState<Promotion> = project_item(ready(json!({"data": {"id": 4}})));
    assert_eq!(state.item.unwrap().id, 4);
  }
}
