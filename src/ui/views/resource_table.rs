use std::collections::BTreeSet;

use crate::api::BatchDeleteError;
use crate::cache::FetchStatus;
use crate::resources::{ListOptions, ListQuery, ListState as ListData};
use crate::ui::components::{
  KeyResult, Notice, NoticeSender, Notices, SearchEvent, SearchInput, SortColumn, TableControls,
};
use crate::ui::ensure_valid_selection;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// A resource that can be shown as a row of a [`ResourceTable`].
pub trait TableRow: DeserializeOwned + Clone + Send + Sync + 'static {
  const HEADERS: &'static [&'static str];
  const SORT_COLUMNS: &'static [SortColumn];

  fn id(&self) -> u64;
  fn name(&self) -> &str;
  fn widths() -> Vec<Constraint>;
  fn cells(&self) -> Vec<Cell<'static>>;
}

type Loader<T> = Box<dyn Fn(&ListOptions) -> ListQuery<T>>;

/// Server-paginated table over a list accessor, with a name filter,
/// multi-row selection and a confirmed bulk delete.
pub struct ResourceTable<T: TableRow> {
  title: &'static str,
  load: Loader<T>,
  query: ListQuery<T>,
  data: ListData<T>,
  controls: TableControls,
  search: SearchInput,
  table_state: TableState,
  selected: BTreeSet<u64>,
  pending_delete: Option<Vec<u64>>,
  notices: Notices,
}

/// Keys the table itself does not handle, for the owning view.
pub enum TableEvent {
  /// Bulk delete confirmed for these ids
  Delete(Vec<u64>),
  Key(KeyEvent),
}

impl<T: TableRow> ResourceTable<T> {
  pub fn new<F>(title: &'static str, page_size: u32, load: F) -> Self
  where
    F: Fn(&ListOptions) -> ListQuery<T> + 'static,
  {
    let controls = TableControls::new(T::SORT_COLUMNS, page_size);
    let query = load(&controls.options());
    let data = query.current();
    Self {
      title,
      load: Box::new(load),
      query,
      data,
      controls,
      search: SearchInput::new(),
      table_state: TableState::default(),
      selected: BTreeSet::new(),
      pending_delete: None,
      notices: Notices::new(),
    }
  }

  pub fn query(&self) -> &ListQuery<T> {
    &self.query
  }

  pub fn notices(&self) -> NoticeSender {
    self.notices.sender()
  }

  pub fn is_capturing(&self) -> bool {
    self.search.is_active() || self.pending_delete.is_some()
  }

  /// Rows on the current page that pass the name filter.
  pub fn visible_rows(&self) -> Vec<&T> {
    self
      .data
      .list
      .iter()
      .filter(|row| self.search.matches(row.name()))
      .collect()
  }

  pub fn current_row(&self) -> Option<&T> {
    let rows = self.visible_rows();
    self.table_state.selected().and_then(|i| rows.get(i).copied())
  }

  /// Checked rows, or the highlighted one when nothing is checked.
  fn targets(&self) -> Vec<u64> {
    if self.selected.is_empty() {
      self.current_row().map(|row| vec![row.id()]).unwrap_or_default()
    } else {
      self.selected.iter().copied().collect()
    }
  }

  pub fn tick(&mut self) {
    self.data = self.query.current();
    self.controls.set_total(self.data.total());
    self.notices.poll();
  }

  fn reload(&mut self) {
    self.query = (self.load)(&self.controls.options());
    self.data = self.query.current();
  }

  /// Refetch the current page in the background.
  pub fn refresh(&self) {
    let query = self.query.clone();
    tokio::spawn(async move {
      query.mutate().await;
    });
  }

  /// Uncheck rows once a bulk delete has been dispatched.
  pub fn clear_selection(&mut self) {
    self.selected.clear();
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<TableEvent> {
    if let Some(ids) = self.pending_delete.take() {
      if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        return KeyResult::Event(TableEvent::Delete(ids));
      }
      self.notices.push(Notice::Info("Delete cancelled".to_string()));
      return KeyResult::Handled;
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(_)) => {
        self.table_state.select(Some(0));
        return KeyResult::Handled;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return KeyResult::Handled,
      KeyResult::NotHandled => {}
    }

    match self.controls.handle_key(key) {
      KeyResult::Event(()) => {
        self.reload();
        return KeyResult::Handled;
      }
      KeyResult::Handled => return KeyResult::Handled,
      KeyResult::NotHandled => {}
    }

    let len = self.visible_rows().len();
    match key.code {
      KeyCode::Char('j') | KeyCode::Down if len > 0 => {
        let i = self.table_state.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.table_state.select(Some(i));
      }
      KeyCode::Char('k') | KeyCode::Up => {
        let i = self.table_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.table_state.select(Some(i));
      }
      KeyCode::Char(' ') => {
        if let Some(id) = self.current_row().map(TableRow::id) {
          if !self.selected.remove(&id) {
            self.selected.insert(id);
          }
        }
      }
      KeyCode::Char('d') => {
        let ids = self.targets();
        if !ids.is_empty() {
          self.pending_delete = Some(ids);
        }
      }
      KeyCode::Char('r') => {
        self.notices.dismiss();
        self.refresh();
      }
      KeyCode::Esc if !self.selected.is_empty() => self.selected.clear(),
      _ => return KeyResult::Event(TableEvent::Key(key)),
    }
    KeyResult::Handled
  }

  pub fn render(&mut self, frame: &mut Frame, area: Rect) {
    let [table_area, status_area, notice_area] = Layout::vertical([
      Constraint::Min(3),
      Constraint::Length(1),
      Constraint::Length(1),
    ])
    .areas(area);

    let title = match &self.data.error {
      Some(_) => format!(" {} (error) ", self.title),
      None if self.data.status == FetchStatus::Revalidating => format!(" {} (refreshing...) ", self.title),
      None => format!(" {} ({}) ", self.title, self.data.total()),
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let rows = self.visible_rows();
    if rows.is_empty() {
      let (content, color) = placeholder(&self.data, self.title);
      let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, table_area);
    } else {
      let body: Vec<Row> = rows
        .iter()
        .map(|row| {
          let mark = if self.selected.contains(&row.id()) { "[x]" } else { "[ ]" };
          let mut cells = vec![Cell::from(mark)];
          cells.extend(row.cells());
          Row::new(cells)
        })
        .collect();
      let len = body.len();

      let header = Row::new(
        std::iter::once("").chain(T::HEADERS.iter().copied()).map(|h| {
          Cell::from(h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        }),
      );
      let mut widths = vec![Constraint::Length(3)];
      widths.extend(T::widths());

      let table = Table::new(body, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

      ensure_valid_selection(&mut self.table_state, len);
      frame.render_stateful_widget(table, table_area, &mut self.table_state);
    }

    let mut status = self.controls.status_line();
    if !self.selected.is_empty() {
      status.push_span(Span::styled(
        format!(" · {} selected", self.selected.len()),
        Style::default().fg(Color::Magenta),
      ));
    }
    if !self.search.query().is_empty() {
      status.push_span(Span::styled(
        format!(" · filter \"{}\"", self.search.query()),
        Style::default().fg(Color::Yellow),
      ));
    }
    frame.render_widget(Paragraph::new(status), status_area);

    if let Some(ids) = &self.pending_delete {
      let prompt = format!(" Delete {} {}? (y/N)", ids.len(), plural(ids.len(), "row"));
      frame.render_widget(
        Paragraph::new(prompt).style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        notice_area,
      );
    } else {
      self.notices.render(frame, notice_area);
    }

    self.search.render_overlay(frame, area);
  }
}

fn placeholder<T>(data: &ListData<T>, title: &str) -> (String, Color) {
  if let Some(error) = &data.error {
    return (
      format!("Failed to load {}: {}\n\nPress 'r' to retry.", title.to_lowercase(), error.message()),
      Color::Red,
    );
  }
  if data.is_loading || matches!(data.status, FetchStatus::Loading | FetchStatus::Revalidating) {
    return ("Loading...".to_string(), Color::DarkGray);
  }
  if data.status == FetchStatus::Idle {
    return (
      "No store context. Set api.context in the config or pass --context.".to_string(),
      Color::DarkGray,
    );
  }
  (format!("No {} found.", title.to_lowercase()), Color::DarkGray)
}

pub fn plural(n: usize, word: &str) -> String {
  if n == 1 {
    word.to_string()
  } else {
    format!("{}s", word)
  }
}

/// Message for a finished bulk delete.
pub fn delete_notice(what: &str, result: &Result<Vec<u64>, BatchDeleteError>) -> Notice {
  match result {
    Ok(deleted) => {
      info!(what, count = deleted.len(), "bulk delete finished");
      Notice::Info(format!("Deleted {} {}", deleted.len(), plural(deleted.len(), what)))
    }
    Err(e) => {
      warn!(what, error = %e, "bulk delete stopped");
      Notice::Error(format!(
        "Deleted {}, failed on #{}: {} ({} not attempted)",
        e.deleted.len(),
        e.failed,
        e.source.message(),
        e.not_attempted.len()
      ))
    }
  }
}
