//! Sequential bulk operations.

use tracing::{info, warn};

use super::client::ResourceClient;
use super::error::ApiError;
use super::params::QueryParams;

/// A bulk delete stopped at its first failure.
///
/// Deletions that already succeeded stay applied; nothing is rolled back.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to delete {failed} ({} deleted, {} not attempted): {source}", .deleted.len(), .not_attempted.len())]
pub struct BatchDeleteError {
  /// Ids deleted before the failure, in order
  pub deleted: Vec<u64>,
  /// Id whose delete call failed
  pub failed: u64,
  /// Ids after the failure that were never sent
  pub not_attempted: Vec<u64>,
  #[source]
  pub source: ApiError,
}

/// Delete `ids` one request at a time, in order.
///
/// `path_for` maps an id to its resource path (e.g. `/api/coupons/{id}`).
/// Returns the deleted ids, or the first failure together with what was and
/// wasn't applied.
pub async fn delete_sequential<F>(
  client: &ResourceClient,
  ids: &[u64],
  params: &QueryParams,
  path_for: F,
) -> Result<Vec<u64>, BatchDeleteError>
where
  F: Fn(u64) -> String,
{
  let mut deleted = Vec::with_capacity(ids.len());

  for (idx, &id) in ids.iter().enumerate() {
    if let Err(source) = client.delete(&path_for(id), params).await {
      warn!(id, error = %source, "bulk delete aborted");
      return Err(BatchDeleteError {
        deleted,
        failed: id,
        not_attempted: ids[idx + 1..].to_vec(),
        source,
      });
    }
    deleted.push(id);
  }

  info!(count = deleted.len(), "bulk delete finished");
  Ok(deleted)
}
