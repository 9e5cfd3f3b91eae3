//! Stale-while-revalidate fetch cache.
//!
//! This module provides a resource-agnostic cache that:
//! - Stores the last response (or error) per [`CacheKey`]
//! - Serves the stored value immediately and revalidates in the background
//! - Deduplicates concurrent requests for the same key into one network call
//! - Supports manual invalidation (`mutate`) where the newest fetch always wins

mod key;
mod layer;
mod subscription;

pub use key::CacheKey;
pub use layer::{FetchCache, FetchResult, Fetcher};
pub use subscription::{FetchStatus, Snapshot, Subscription};
