use std::fmt;

use crate::api::QueryParams;

/// Identity of a cached request: resource path plus serialized query string.
///
/// Two keys are equal only if both parts are byte-identical, so parameter
/// order matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
  path: String,
  query: String,
}

impl CacheKey {
  pub fn new(path: impl Into<String>, params: &QueryParams) -> Self {
    Self {
      path: path.into(),
      query: params.serialize(),
    }
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  /// Serialized query string, without the leading `?`.
  pub fn query(&self) -> &str {
    &self.query
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.query.is_empty() {
      f.write_str(&self.path)
    } else {
      write!(f, "{}?{}", self.path, self.query)
    }
  }
}
