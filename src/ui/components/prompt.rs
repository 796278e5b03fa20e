use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::ui::renderfns::centered;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by a prompt, tagged with what it was opened for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent<P> {
  Submitted(P, String),
  Cancelled,
}

/// One-line input overlay, e.g. the admin password or the reset secret
#[derive(Debug, Clone)]
pub struct Prompt<P> {
  open: Option<(P, String)>,
  input: TextInput,
}

impl<P> Default for Prompt<P> {
  fn default() -> Self {
    Self {
      open: None,
      input: TextInput::new(),
    }
  }
}

impl<P: Clone> Prompt<P> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.open.is_some()
  }

  /// Open the prompt; `masked` hides what is typed.
  pub fn show(&mut self, purpose: P, title: impl Into<String>, masked: bool) {
    self.input = if masked {
      TextInput::masked()
    } else {
      TextInput::new()
    };
    self.open = Some((purpose, title.into()));
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PromptEvent<P>> {
    let Some((purpose, _)) = &self.open else {
      return KeyResult::NotHandled;
    };

    match self.input.handle_key(key) {
      InputResult::Submitted(value) => {
        let purpose = purpose.clone();
        self.close();
        KeyResult::Event(PromptEvent::Submitted(purpose, value))
      }
      InputResult::Cancelled => {
        self.close();
        KeyResult::Event(PromptEvent::Cancelled)
      }
      // Swallow everything else while open
      InputResult::Consumed | InputResult::NotHandled => KeyResult::Handled,
    }
  }

  fn close(&mut self) {
    self.open = None;
    self.input.clear();
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let Some((_, title)) = &self.open else {
      return;
    };

    let overlay_area = centered(area, 50, 3);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", title));

    let line = Line::from(vec![
      Span::styled("> ", Style::default().fg(Color::Yellow)),
      Span::raw(self.input.display()),
      Span::styled("_", Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), overlay_area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::{KeyCode, KeyModifiers};

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_inactive_passes_keys_through() {
    let mut prompt: Prompt<u8> = Prompt::new();
    assert_eq!(prompt.handle_key(key(KeyCode::Char('a'))), KeyResult::NotHandled);
  }

  #[test]
  fn test_submit_returns_purpose_and_value() {
    let mut prompt = Prompt::new();
    prompt.show("login", "Admin password", true);
    prompt.handle_key(key(KeyCode::Char('o')));
    prompt.handle_key(key(KeyCode::Char('k')));
    assert_eq!(
      prompt.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(PromptEvent::Submitted("login", "ok".to_string()))
    );
    assert!(!prompt.is_active());
  }

  #[test]
  fn test_reopen_starts_empty() {
    let mut prompt = Prompt::new();
    prompt.show(1, "first", false);
    prompt.handle_key(key(KeyCode::Char('x')));
    prompt.handle_key(key(KeyCode::Esc));

    prompt.show(2, "second", false);
    assert_eq!(
      prompt.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(PromptEvent::Submitted(2, String::new()))
    );
  }
}
