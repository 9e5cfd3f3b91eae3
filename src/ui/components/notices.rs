use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc;

/// Outcome of a background task, shown under the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  Info(String),
  Error(String),
}

pub type NoticeSender = mpsc::UnboundedSender<Notice>;

/// Mailbox for background tasks: they send, the view polls on tick.
#[derive(Debug)]
pub struct Notices {
  tx: NoticeSender,
  rx: mpsc::UnboundedReceiver<Notice>,
  latest: Option<Notice>,
}

impl Default for Notices {
  fn default() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self { tx, rx, latest: None }
  }
}

impl Notices {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn sender(&self) -> NoticeSender {
    self.tx.clone()
  }

  pub fn push(&mut self, notice: Notice) {
    self.latest = Some(notice);
  }

  /// Keep only the newest pending notice.
  pub fn poll(&mut self) {
    while let Ok(notice) = self.rx.try_recv() {
      self.latest = Some(notice);
    }
  }

  pub fn latest(&self) -> Option<&Notice> {
    self.latest.as_ref()
  }

  pub fn dismiss(&mut self) {
    self.latest = None;
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let Some(notice) = &self.latest else {
      return;
    };
    let (text, color) = match notice {
      Notice::Info(text) => (text, Color::Green),
      Notice::Error(text) => (text, Color::Red),
    };
    frame.render_widget(
      Paragraph::new(format!(" {}", text)).style(Style::default().fg(color)),
      area,
    );
  }
}
