//! Keyed fetch cache with request deduplication.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::channel::oneshot;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tracing::debug;

use super::key::CacheKey;
use super::subscription::{FetchStatus, Snapshot, Subscription};
use crate::api::ApiError;

pub type FetchResult = Result<Value, ApiError>;

/// A fetch in progress, awaitable by any number of subscribers.
type InFlight = Shared<BoxFuture<'static, ()>>;

type Store = Arc<Mutex<HashMap<CacheKey, Entry>>>;

type Request = BoxFuture<'static, FetchResult>;

/// Produces the network request for a key.
#[derive(Clone)]
pub struct Fetcher(Arc<dyn Fn(CacheKey) -> Request + Send + Sync>);

impl Fetcher {
  pub fn new<F, Fut>(fetch: F) -> Self
  where
    F: Fn(CacheKey) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FetchResult> + Send + 'static,
  {
    Self(Arc::new(move |key| fetch(key).boxed()))
  }

  fn call(&self, key: CacheKey) -> Request {
    (self.0)(key)
  }
}

#[derive(Default)]
struct Entry {
  data: Option<Arc<Value>>,
  error: Option<ApiError>,
  in_flight: Option<InFlight>,
  /// Generation of the latest fetch started for this entry. Only that
  /// fetch may write back.
  generation: u64,
  fetched_at: Option<Instant>,
}

impl Entry {
  fn status(&self) -> FetchStatus {
    let has_result = self.data.is_some() || self.error.is_some();
    match (self.in_flight.is_some(), has_result) {
      (true, false) => FetchStatus::Loading,
      (true, true) => FetchStatus::Revalidating,
      (false, _) if self.error.is_some() => FetchStatus::Failed,
      (false, _) if self.data.is_some() => FetchStatus::Ready,
      (false, _) => FetchStatus::Empty,
    }
  }

  fn snapshot(&self) -> Snapshot {
    Snapshot {
      data: self.data.clone(),
      error: self.error.clone(),
      status: self.status(),
    }
  }

  fn is_fresh(&self, dedupe_interval: Duration) -> bool {
    self
      .fetched_at
      .map(|t| t.elapsed() < dedupe_interval)
      .unwrap_or(false)
  }
}

/// Process-wide store of fetched resources, shared by every subscriber.
///
/// Entries are created lazily on first subscription, updated on every
/// completed fetch, and only removed by [`FetchCache::clear`]. Clones share
/// the same store; create separate instances for isolated caches.
///
/// Fetches are spawned on the tokio runtime, so subscribing requires a
/// runtime context. A subscriber going away never cancels a fetch.
#[derive(Clone)]
pub struct FetchCache {
  store: Store,
  /// Shared by every entry so a recreated entry never reuses a generation.
  generations: Arc<AtomicU64>,
  /// A value fetched within this interval is not refetched on resubscribe
  dedupe_interval: Duration,
}

impl Default for FetchCache {
  fn default() -> Self {
    Self::new()
  }
}

impl FetchCache {
  pub fn new() -> Self {
    Self {
      store: Arc::new(Mutex::new(HashMap::new())),
      generations: Arc::new(AtomicU64::new(0)),
      dedupe_interval: Duration::from_secs(2),
    }
  }

  pub fn with_dedupe_interval(mut self, dedupe_interval: Duration) -> Self {
    self.dedupe_interval = dedupe_interval;
    self
  }

  /// Subscribe to `key`, starting a fetch when needed.
  ///
  /// A `None` key skips fetching entirely: the subscription stays idle and
  /// never touches the network.
  pub fn subscribe(&self, key: Option<CacheKey>, fetcher: Fetcher) -> Subscription {
    if let Some(key) = &key {
      self.revalidate(key, &fetcher);
    }
    Subscription::new(self.clone(), key, fetcher)
  }

  pub fn snapshot(&self, key: &CacheKey) -> Snapshot {
    self
      .lock()
      .get(key)
      .map(Entry::snapshot)
      .unwrap_or_default()
  }

  /// Wait until no fetch for `key` is in flight, following superseding
  /// fetches, then return the stored state.
  pub async fn settled(&self, key: &CacheKey) -> Snapshot {
    loop {
      let pending = self.lock().get(key).and_then(|e| e.in_flight.clone());
      match pending {
        Some(in_flight) => in_flight.await,
        None => return self.snapshot(key),
      }
    }
  }

  /// Drop every entry. In-flight fetches finish without writing back, even
  /// into an entry recreated for the same key.
  pub fn clear(&self) {
    self.lock().clear();
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  pub(super) fn revalidate(&self, key: &CacheKey, fetcher: &Fetcher) {
    let pending = {
      let mut store = self.lock();
      let entry = store.entry(key.clone()).or_default();

      if entry.in_flight.is_some() {
        debug!(%key, "joining in-flight fetch");
        return;
      }
      if entry.is_fresh(self.dedupe_interval) {
        debug!(%key, "cached value is fresh");
        return;
      }

      self.start_fetch(entry, key)
    };
    pending.request(fetcher);
  }

  /// Supersede whatever is in flight for `key` and start a new fetch.
  pub(super) fn invalidate(&self, key: &CacheKey, fetcher: &Fetcher) -> InFlight {
    let pending = {
      let mut store = self.lock();
      let entry = store.entry(key.clone()).or_default();
      if entry.in_flight.is_some() {
        debug!(%key, generation = entry.generation, "superseding in-flight fetch");
      }
      self.start_fetch(entry, key)
    };
    pending.request(fetcher)
  }

  /// Register a fetch for `entry` and spawn the task that will run it. The
  /// request itself is built by [`PendingFetch::request`] once the store
  /// lock is released, so fetchers are free to read the cache.
  fn start_fetch(&self, entry: &mut Entry, key: &CacheKey) -> PendingFetch {
    let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
    entry.generation = generation;
    debug!(%key, generation, "starting fetch");

    let (request_tx, request_rx) = oneshot::channel::<Request>();
    let store = Arc::clone(&self.store);
    let task_key = key.clone();

    let task = async move {
      let result = match request_rx.await {
        Ok(request) => request.await,
        Err(_) => Err(ApiError::Transport("request was never started".to_string())),
      };
      complete(&store, &task_key, generation, result);
    }
    .boxed()
    .shared();

    entry.in_flight = Some(task.clone());
    tokio::spawn(task.clone());
    PendingFetch {
      key: key.clone(),
      task,
      request_tx,
    }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
    lock_store(&self.store)
  }
}

/// A fetch registered in the store that still waits for its request.
struct PendingFetch {
  key: CacheKey,
  task: InFlight,
  request_tx: oneshot::Sender<Request>,
}

impl PendingFetch {
  fn request(self, fetcher: &Fetcher) -> InFlight {
    let request = fetcher.call(self.key);
    // The receiver lives in the spawned task, which only ends after receiving.
    let _ = self.request_tx.send(request);
    self.task
  }
}

/// Store a fetch result unless a newer fetch for the key has started.
fn complete(store: &Store, key: &CacheKey, generation: u64, result: FetchResult) {
  let mut store = lock_store(store);
  let Some(entry) = store.get_mut(key) else {
    debug!(%key, "entry cleared before fetch completed");
    return;
  };

  if entry.generation != generation {
    debug!(%key, generation, current = entry.generation, "discarding superseded result");
    return;
  }

  entry.in_flight = None;
  entry.fetched_at = Some(Instant::now());
  match result {
    Ok(value) => {
      debug!(%key, "fetch succeeded");
      entry.data = Some(Arc::new(value));
      entry.error = None;
    }
    Err(error) => {
      debug!(%key, %error, "fetch failed");
      entry.error = Some(error);
    }
  }
}

// Entries hold plain data, so a panic mid-update cannot leave one half-written.
fn lock_store(store: &Store) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
  store.lock().unwrap_or_else(PoisonError::into_inner)
}
