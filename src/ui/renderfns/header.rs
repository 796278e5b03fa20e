use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar: name, data source, admin badge and the current
/// view's shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, source: &str, is_admin: bool, shortcuts: &[ShortcutInfo]) {
  let mut spans = vec![
    Span::styled(" woodshop ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", source), Style::default().fg(Color::White)),
  ];
  if is_admin {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(" admin ", Style::default().fg(Color::Yellow).bold()));
  }
  spans.push(Span::raw(" "));

  let mut shortcuts = shortcuts.to_vec();
  shortcuts.sort_by_key(|s| s.priority);
  for shortcut in shortcuts {
    spans.push(Span::styled(
      format!(" <{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {} ", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
