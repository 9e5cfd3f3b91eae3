//! Query parameters sent with every resource request.

use std::fmt;

/// Ordered string parameters for a request's query string.
///
/// Insertion order is preserved so that two requests built the same way
/// serialize to the same string. Absent values are dropped at insertion time
/// and never reach the wire as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
  pairs: Vec<(String, String)>,
}

impl QueryParams {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set `key` to `value`, replacing an existing value in place.
  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
    let key = key.into();
    let value = value.into();
    match self.pairs.iter_mut().find(|(k, _)| *k == key) {
      Some(pair) => pair.1 = value,
      None => self.pairs.push((key, value)),
    }
    self
  }

  /// Set `key` only when `value` is present.
  pub fn set_opt<V: Into<String>>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
    if let Some(value) = value {
      self.set(key, value);
    }
    self
  }

  /// Builder-style variant of [`QueryParams::set`].
  pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.set(key, value);
    self
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .pairs
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  pub fn is_empty(&self) -> bool {
    self.pairs.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Serialize as `application/x-www-form-urlencoded` (no leading `?`).
  pub fn serialize(&self) -> String {
    url::form_urlencoded::Serializer::new(String::new())
      .extend_pairs(self.pairs.iter())
      .finish()
  }
}

impl fmt::Display for QueryParams {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.serialize())
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut params = Self::new();
    for (k, v) in iter {
      params.set(k, v);
    }
    params
  }
}
