use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Header bar: app name, store title, breadcrumb, then the view's shortcuts.
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  breadcrumb: &str,
  shortcuts: &[ShortcutInfo],
) {
  let separator = || Span::styled("│", Style::default().fg(Color::DarkGray));
  let mut spans = vec![
    Span::styled(" promodash ", Style::default().fg(Color::Cyan).bold()),
    separator(),
    Span::styled(format!(" {} ", title), Style::default().fg(Color::White)),
    separator(),
    Span::styled(format!(" {} ", breadcrumb), Style::default().fg(Color::Yellow).bold()),
    Span::raw(" "),
  ];
  for shortcut in shortcuts {
    spans.push(Span::styled(format!(" <{}>", shortcut.key), Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(format!(" {}", shortcut.label), Style::default().fg(Color::DarkGray)));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
