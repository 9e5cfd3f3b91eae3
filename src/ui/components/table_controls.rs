use super::KeyResult;
use crate::config::PAGE_SIZES;
use crate::resources::{ListOptions, SortDirection};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

/// A sortable column: header label and the field name the API sorts by.
#[derive(Debug, Clone, Copy)]
pub struct SortColumn {
  pub label: &'static str,
  pub field: &'static str,
}

/// Paging and sorting state for a server-paginated table.
///
/// Keys: `n`/`p` page, `+`/`-` items per page, `s` next sort column, `S`
/// flip direction. Emits `Event(())` whenever the list options change.
#[derive(Debug, Clone)]
pub struct TableControls {
  columns: &'static [SortColumn],
  page: u32,
  limit: u32,
  /// Index into `columns`; `None` leaves ordering to the server
  sort: Option<usize>,
  direction: SortDirection,
  total: u64,
}

impl TableControls {
  pub fn new(columns: &'static [SortColumn], limit: u32) -> Self {
    Self {
      columns,
      page: 1,
      limit: if PAGE_SIZES.contains(&limit) { limit } else { PAGE_SIZES[0] },
      sort: None,
      direction: SortDirection::default(),
      total: 0,
    }
  }

  pub fn options(&self) -> ListOptions {
    let options = ListOptions::new().page(self.page).limit(self.limit);
    match self.sort.and_then(|i| self.columns.get(i)) {
      Some(column) => options.sort(column.field, self.direction),
      None => options,
    }
  }

  pub fn page_count(&self) -> u32 {
    let pages = self.total.div_ceil(self.limit as u64).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
  }

  /// Record the server's item count so paging stops at the last page.
  pub fn set_total(&mut self, total: u64) {
    self.total = total;
  }

  pub fn sorted_by(&self) -> Option<(&'static str, SortDirection)> {
    self
      .sort
      .and_then(|i| self.columns.get(i))
      .map(|c| (c.label, self.direction))
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<()> {
    let changed = match key.code {
      KeyCode::Char('n') | KeyCode::Right if self.page < self.page_count() => {
        self.page += 1;
        true
      }
      KeyCode::Char('p') | KeyCode::Left if self.page > 1 => {
        self.page -= 1;
        true
      }
      KeyCode::Char('+') => self.step_limit(1),
      KeyCode::Char('-') => self.step_limit(-1),
      KeyCode::Char('s') if !self.columns.is_empty() => {
        self.sort = match self.sort {
          None => Some(0),
          Some(i) if i + 1 < self.columns.len() => Some(i + 1),
          Some(_) => None,
        };
        true
      }
      KeyCode::Char('S') if self.sort.is_some() => {
        self.direction = self.direction.toggle();
        true
      }
      KeyCode::Char('n' | 'p' | 's' | 'S') | KeyCode::Left | KeyCode::Right => false,
      _ => return KeyResult::NotHandled,
    };

    if changed {
      KeyResult::Event(())
    } else {
      KeyResult::Handled
    }
  }

  /// Changing the page size always resets to page 1.
  fn step_limit(&mut self, step: isize) -> bool {
    let current = PAGE_SIZES.iter().position(|&s| s == self.limit).unwrap_or(0);
    let next = current.saturating_add_signed(step).min(PAGE_SIZES.len() - 1);
    if next == current {
      return false;
    }
    self.limit = PAGE_SIZES[next];
    self.page = 1;
    true
  }

  /// `page 2/5 · 20 per page · 93 total · sort name ↑`
  pub fn status_line(&self) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
      Span::styled(format!(" page {}/{}", self.page, self.page_count()), Style::default().fg(Color::Cyan)),
      Span::styled(format!(" · {} per page · {} total", self.limit, self.total), dim),
    ];
    if let Some((label, direction)) = self.sorted_by() {
      let arrow = match direction {
        SortDirection::Asc => "↑",
        SortDirection::Desc => "↓",
      };
      spans.push(Span::styled(format!(" · sort {} {}", label.to_lowercase(), arrow), dim));
    }
    Line::from(spans)
  }
}
