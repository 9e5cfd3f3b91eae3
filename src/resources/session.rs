/// Store context shared by every accessor.
///
/// Until a context token is known, accessors skip fetching entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
  context: Option<String>,
}

impl Session {
  pub fn new(context: Option<String>) -> Self {
    Self {
      context: context.filter(|c| !c.is_empty()),
    }
  }

  pub fn with_context(context: impl Into<String>) -> Self {
    Self::new(Some(context.into()))
  }

  pub fn context(&self) -> Option<&str> {
    self.context.as_deref()
  }

  pub fn is_ready(&self) -> bool {
    self.context.is_some()
  }
}
