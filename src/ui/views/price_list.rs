use std::path::PathBuf;

use crate::api::types::PriceList;
use crate::resources::Resources;
use crate::ui::components::{InputResult, KeyResult, Notice, SortColumn, TextInput};
use crate::ui::renderfns::{format_date, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::resource_table::{delete_notice, ResourceTable, TableEvent, TableRow};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph};
use serde_json::json;
use tracing::{error, info, warn};

impl TableRow for PriceList {
  const HEADERS: &'static [&'static str] = &["ID", "Name", "Active", "Created", "Modified"];
  const SORT_COLUMNS: &'static [SortColumn] = &[
    SortColumn { label: "Name", field: "name" },
    SortColumn { label: "Created", field: "date_created" },
    SortColumn { label: "Modified", field: "date_modified" },
  ];

  fn id(&self) -> u64 {
    self.id
  }

  fn name(&self) -> &str {
    &self.name
  }

  fn widths() -> Vec<Constraint> {
    vec![
      Constraint::Length(8),
      Constraint::Min(24),
      Constraint::Length(8),
      Constraint::Length(12),
      Constraint::Length(12),
    ]
  }

  fn cells(&self) -> Vec<Cell<'static>> {
    let (active, color) = if self.active {
      ("yes", Color::Green)
    } else {
      ("no", Color::DarkGray)
    };
    let date = |d: &Option<String>| d.as_deref().map_or_else(|| "-".to_string(), format_date);
    vec![
      Cell::from(self.id.to_string()).style(Style::default().fg(Color::Cyan)),
      Cell::from(truncate(&self.name, 48)),
      Cell::from(active).style(Style::default().fg(color)),
      Cell::from(date(&self.date_created)),
      Cell::from(date(&self.date_modified)),
    ]
  }
}

/// Price lists of the current store: create, activate/deactivate, bulk
/// delete and CSV export.
pub struct PriceListView {
  resources: Resources,
  table: ResourceTable<PriceList>,
  export_dir: PathBuf,
  /// Name prompt of a price list being created
  new_name: Option<TextInput>,
}

impl PriceListView {
  pub fn new(resources: Resources, page_size: u32, export_dir: PathBuf) -> Self {
    let accessor = resources.clone();
    let table = ResourceTable::new("Price lists", page_size, move |options| {
      accessor.price_lists(options)
    });
    Self {
      resources,
      table,
      export_dir,
      new_name: None,
    }
  }

  fn handle_name_key(&mut self, key: KeyEvent) {
    let Some(input) = self.new_name.as_mut() else {
      return;
    };
    match input.handle_key(key) {
      InputResult::Submitted(name) => {
        self.new_name = None;
        let name = name.trim();
        if name.is_empty() {
          let _ = self.table.notices().send(Notice::Error("A price list needs a name".to_string()));
        } else {
          self.create(name.to_string());
        }
      }
      InputResult::Cancelled => self.new_name = None,
      InputResult::Consumed | InputResult::NotHandled => {}
    }
  }

  fn create(&mut self, name: String) {
    let resources = self.resources.clone();
    let query = self.table.query().clone();
    let notices = self.table.notices();

    tokio::spawn(async move {
      let body = json!({ "name": name, "active": true });
      let notice = match resources.create_price_list(&body).await {
        Ok(_) => {
          info!(name = %name, "price list created");
          Notice::Info(format!("Created {}", name))
        }
        Err(e) => {
          warn!(name = %name, error = %e, "price list create failed");
          Notice::Error(format!("Could not create {}: {}", name, e.message()))
        }
      };
      query.mutate().await;
      let _ = notices.send(notice);
    });
  }

  fn toggle_active(&mut self) {
    let Some(list) = self.table.current_row().cloned() else {
      return;
    };
    let resources = self.resources.clone();
    let query = self.table.query().clone();
    let notices = self.table.notices();

    tokio::spawn(async move {
      let body = json!({ "name": list.name, "active": !list.active });
      let notice = match resources.update_price_list(list.id, &body).await {
        Ok(_) if list.active => Notice::Info(format!("{} is now inactive", list.name)),
        Ok(_) => Notice::Info(format!("{} is now active", list.name)),
        Err(e) => {
          warn!(id = list.id, error = %e, "price list update failed");
          Notice::Error(format!("Could not update {}: {}", list.name, e.message()))
        }
      };
      query.mutate().await;
      let _ = notices.send(notice);
    });
  }

  fn render_name_prompt(&self, frame: &mut Frame, area: Rect) {
    let Some(input) = &self.new_name else {
      return;
    };
    let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, 3);
    frame.render_widget(Clear, overlay_area);

    let line = Line::from(vec![
      Span::raw(input.value()),
      Span::styled("_", Style::default().fg(Color::Yellow)),
    ]);
    let paragraph = Paragraph::new(line).block(
      Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" New price list "),
    );
    frame.render_widget(paragraph, overlay_area);
  }

  fn delete(&mut self, ids: Vec<u64>) {
    self.table.clear_selection();
    let resources = self.resources.clone();
    let query = self.table.query().clone();
    let notices = self.table.notices();

    tokio::spawn(async move {
      let result = resources.delete_price_lists(&ids).await;
      query.mutate().await;
      let _ = notices.send(delete_notice("price list", &result));
    });
  }

  fn export(&mut self) {
    let resources = self.resources.clone();
    let notices = self.table.notices();
    let dir = self.export_dir.clone();
    let _ = notices.send(Notice::Info("Exporting price list records...".to_string()));

    tokio::spawn(async move {
      let notice = match resources.export_price_lists().await {
        Ok(export) => {
          let path = dir.join(export.filename());
          match tokio::fs::write(&path, export.body.as_bytes()).await {
            Ok(()) => {
              info!(path = %path.display(), rows = export.rows, "export written");
              Notice::Info(format!("Exported {} rows to {}", export.rows, path.display()))
            }
            Err(e) => {
              error!(path = %path.display(), error = %e, "export write failed");
              Notice::Error(format!("Could not write {}: {}", path.display(), e))
            }
          }
        }
        Err(e) => {
          error!(error = %e, "export failed");
          Notice::Error(format!("Export failed: {}", e))
        }
      };
      let _ = notices.send(notice);
    });
  }
}

impl View for PriceListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.new_name.is_some() {
      self.handle_name_key(key);
      return ViewAction::None;
    }
    match self.table.handle_key(key) {
      KeyResult::Event(TableEvent::Delete(ids)) => self.delete(ids),
      KeyResult::Event(TableEvent::Key(key)) => match key.code {
        KeyCode::Char('c') => self.new_name = Some(TextInput::new()),
        KeyCode::Char('a') => self.toggle_active(),
        KeyCode::Char('e') => self.export(),
        KeyCode::Char('q') => return ViewAction::Pop,
        _ => {}
      },
      KeyResult::Handled | KeyResult::NotHandled => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.table.render(frame, area);
    self.render_name_prompt(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "price lists".to_string()
  }

  fn tick(&mut self) {
    self.table.tick();
  }

  fn is_capturing(&self) -> bool {
    self.new_name.is_some() || self.table.is_capturing()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command"),
      ShortcutInfo::new("/", "filter"),
      ShortcutInfo::new("space", "select"),
      ShortcutInfo::new("c", "create"),
      ShortcutInfo::new("a", "(de)activate"),
      ShortcutInfo::new("d", "delete"),
      ShortcutInfo::new("e", "export csv"),
      ShortcutInfo::new("n/p", "page"),
      ShortcutInfo::new("r", "refresh"),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::ResourceClient;
  use crate::cache::FetchCache;
  use crate::resources::Session;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn view() -> PriceListView {
    // No context: the table never fetches.
    let client = ResourceClient::new("http://127.0.0.1:9").unwrap();
    let resources = Resources::new(client, FetchCache::new(), Session::new(None));
    PriceListView::new(resources, 20, PathBuf::from("."))
  }

  #[tokio::test]
  async fn test_create_prompt_captures_keys_until_cancelled() {
    let mut view = view();
    assert!(!view.is_capturing());

    view.handle_key(key(KeyCode::Char('c')));
    assert!(view.is_capturing());

    // 'q' is typed into the name, not treated as "back"
    assert!(matches!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::None));
    assert_eq!(view.new_name.as_ref().map(TextInput::value).as_deref(), Some("q"));

    view.handle_key(key(KeyCode::Esc));
    assert!(!view.is_capturing());
  }

  #[tokio::test]
  async fn test_blank_name_is_not_submitted() {
    let mut view = view();
    view.handle_key(key(KeyCode::Char('c')));
    view.handle_key(key(KeyCode::Char(' ')));
    view.handle_key(key(KeyCode::Enter));
    assert!(view.new_name.is_none());
    assert!(view.resources.cache().is_empty());
  }
}
