use crate::api::QueryParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

impl SortDirection {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Asc => "asc",
      Self::Desc => "desc",
    }
  }

  pub fn toggle(self) -> Self {
    match self {
      Self::Asc => Self::Desc,
      Self::Desc => Self::Asc,
    }
  }
}

/// Paging and sorting for list accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
  pub page: Option<u32>,
  pub limit: Option<u32>,
  /// Column to sort by; `direction` is only sent alongside it
  pub sort: Option<String>,
  pub direction: SortDirection,
}

impl ListOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn page(mut self, page: u32) -> Self {
    self.page = Some(page);
    self
  }

  pub fn limit(mut self, limit: u32) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
    self.sort = Some(column.into());
    self.direction = direction;
    self
  }

  pub fn to_params(&self) -> QueryParams {
    let mut params = QueryParams::new();
    params
      .set_opt("page", self.page.map(|p| p.to_string()))
      .set_opt("limit", self.limit.map(|l| l.to_string()))
      .set_opt("sort", self.sort.clone());
    if self.sort.is_some() {
      params.set("direction", self.direction.as_str());
    }
    params
  }
}
