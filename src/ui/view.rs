use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard hint shown in the header
#[derive(Debug, Clone, Copy)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self { key, label }
  }
}

/// What the App should do after a view handled a key
pub enum ViewAction {
  None,
  /// Go back (quits when the root view pops)
  Pop,
}

/// A screen. The App routes keys here unless the command prompt is open.
///
/// Views read cached list state in `tick()`; they never block on the
/// network.
pub trait View {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  fn breadcrumb_label(&self) -> String;

  fn tick(&mut self) {}

  /// True while the view is capturing text (filter prompt, confirmation),
  /// so global keys like `:` and `q` go to the view instead.
  fn is_capturing(&self) -> bool {
    false
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new(":", "command"), ShortcutInfo::new("q", "quit")]
  }
}
