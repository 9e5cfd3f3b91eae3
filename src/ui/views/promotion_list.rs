use crate::api::types::Promotion;
use crate::resources::Resources;
use crate::ui::components::{KeyResult, Notice, SortColumn};
use crate::ui::renderfns::{format_date, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::resource_table::{delete_notice, ResourceTable, TableEvent, TableRow};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Cell;
use tracing::warn;

impl TableRow for Promotion {
  const HEADERS: &'static [&'static str] =
    &["Name", "Code", "Redemption", "Uses", "Start", "End", "Status"];
  const SORT_COLUMNS: &'static [SortColumn] = &[
    SortColumn { label: "Name", field: "name" },
    SortColumn { label: "Uses", field: "current_uses" },
    SortColumn { label: "Start", field: "start_date" },
    SortColumn { label: "Status", field: "status" },
  ];

  fn id(&self) -> u64 {
    self.id
  }

  fn name(&self) -> &str {
    &self.name
  }

  fn widths() -> Vec<Constraint> {
    vec![
      Constraint::Min(20),
      Constraint::Length(14),
      Constraint::Length(12),
      Constraint::Length(12),
      Constraint::Length(12),
      Constraint::Length(12),
      Constraint::Length(9),
    ]
  }

  fn cells(&self) -> Vec<Cell<'static>> {
    let status_color = if self.is_enabled() { Color::Green } else { Color::DarkGray };
    vec![
      Cell::from(truncate(&self.name, 40)),
      Cell::from(self.code.clone().unwrap_or_else(|| "-".to_string()))
        .style(Style::default().fg(Color::Cyan)),
      Cell::from(self.redemption_type.to_lowercase()),
      Cell::from(self.uses_label()),
      Cell::from(format_date(&self.start_date)),
      Cell::from(self.end_date.as_deref().map_or_else(|| "No end date".to_string(), format_date)),
      Cell::from(self.status.clone()).style(Style::default().fg(status_color)),
    ]
  }
}

/// Promotions of the current store, with enable/disable and bulk delete.
pub struct PromotionListView {
  resources: Resources,
  table: ResourceTable<Promotion>,
}

impl PromotionListView {
  pub fn new(resources: Resources, page_size: u32) -> Self {
    let accessor = resources.clone();
    let table = ResourceTable::new("Promotions", page_size, move |options| {
      accessor.promotion_list(options)
    });
    Self { resources, table }
  }

  fn toggle_status(&mut self) {
    let Some(promotion) = self.table.current_row().cloned() else {
      return;
    };
    let status = promotion.toggled_status();
    let resources = self.resources.clone();
    let query = self.table.query().clone();
    let notices = self.table.notices();

    tokio::spawn(async move {
      let notice = match resources.set_promotion_status(promotion.id, status).await {
        Ok(()) => Notice::Info(format!("{} is now {}", promotion.name, status.to_lowercase())),
        Err(e) => {
          warn!(id = promotion.id, error = %e, "status update failed");
          Notice::Error(format!("Could not update {}: {}", promotion.name, e.message()))
        }
      };
      query.mutate().await;
      let _ = notices.send(notice);
    });
  }

  fn delete(&mut self, ids: Vec<u64>) {
    self.table.clear_selection();
    let resources = self.resources.clone();
    let query = self.table.query().clone();
    let notices = self.table.notices();

    tokio::spawn(async move {
      let result = resources.delete_promotions(&ids).await;
      query.mutate().await;
      let _ = notices.send(delete_notice("promotion", &result));
    });
  }
}

impl View for PromotionListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.table.handle_key(key) {
      KeyResult::Event(TableEvent::Delete(ids)) => self.delete(ids),
      KeyResult::Event(TableEvent::Key(key)) => match key.code {
        KeyCode::Char('t') => self.toggle_status(),
        KeyCode::Char('q') => return ViewAction::Pop,
        _ => {}
      },
      KeyResult::Handled | KeyResult::NotHandled => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.table.render(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "promotions".to_string()
  }

  fn tick(&mut self) {
    self.table.tick();
  }

  fn is_capturing(&self) -> bool {
    self.table.is_capturing()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command"),
      ShortcutInfo::new("/", "filter"),
      ShortcutInfo::new("space", "select"),
      ShortcutInfo::new("t", "toggle"),
      ShortcutInfo::new("d", "delete"),
      ShortcutInfo::new("n/p", "page"),
      ShortcutInfo::new("s/S", "sort"),
      ShortcutInfo::new("r", "refresh"),
    ]
  }
}
