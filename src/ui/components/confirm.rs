use super::KeyResult;
use crate::ui::renderfns::centered;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmEvent<P> {
  Confirmed(P),
  Cancelled,
}

/// y/N question overlay guarding destructive actions
#[derive(Debug, Clone)]
pub struct Confirm<P> {
  open: Option<(P, String)>,
}

impl<P> Default for Confirm<P> {
  fn default() -> Self {
    Self { open: None }
  }
}

impl<P: Clone> Confirm<P> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.open.is_some()
  }

  pub fn show(&mut self, purpose: P, question: impl Into<String>) {
    self.open = Some((purpose, question.into()));
  }

  /// Only `y` confirms; any other key cancels.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent<P>> {
    let Some((purpose, _)) = self.open.take() else {
      return KeyResult::NotHandled;
    };

    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => KeyResult::Event(ConfirmEvent::Confirmed(purpose)),
      _ => KeyResult::Event(ConfirmEvent::Cancelled),
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let Some((_, question)) = &self.open else {
      return;
    };

    let overlay_area = centered(area, 50, 5);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(" Confirm ");

    let text = vec![
      Line::from(question.as_str()),
      Line::from(vec![
        Span::styled("<y>", Style::default().fg(Color::Cyan)),
        Span::styled(" yes   ", Style::default().fg(Color::DarkGray)),
        Span::styled("<any>", Style::default().fg(Color::Cyan)),
        Span::styled(" no", Style::default().fg(Color::DarkGray)),
      ]),
    ];
    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, overlay_area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
  }

  #[test]
  fn test_y_confirms() {
    let mut confirm = Confirm::new();
    confirm.show(42u64, "Delete?");
    assert_eq!(
      confirm.handle_key(key('y')),
      KeyResult::Event(ConfirmEvent::Confirmed(42))
    );
    assert!(!confirm.is_active());
  }

  #[test]
  fn test_other_keys_cancel() {
    let mut confirm = Confirm::new();
    confirm.show((), "Reset?");
    assert_eq!(
      confirm.handle_key(key('n')),
      KeyResult::Event(ConfirmEvent::Cancelled)
    );
    assert_eq!(confirm.handle_key(key('y')), KeyResult::NotHandled);
  }
}
