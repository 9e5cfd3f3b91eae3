pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::TableState;

/// Header, active view, and the command overlay on top.
pub fn draw(frame: &mut Frame, app: &mut App) {
  let [header_area, content_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(frame.area());

  let title = app.title().to_string();
  if let Some(view) = app.current_view_mut() {
    let breadcrumb = view.breadcrumb_label();
    let shortcuts = view.shortcuts();
    renderfns::draw_header(frame, header_area, &title, &breadcrumb, &shortcuts);
    view.render(frame, content_area);
  }

  app.command_input().render_overlay(frame, content_area);
}

/// Keep the highlighted row inside `[0, len)`, or clear it when empty.
pub fn ensure_valid_selection(state: &mut TableState, len: usize) {
  if len == 0 {
    state.select(None);
  } else {
    let i = state.selected().unwrap_or(0).min(len - 1);
    state.select(Some(i));
  }
}
