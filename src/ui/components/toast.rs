use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::time::{Duration, Instant};

/// How long a toast stays on screen
const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
  Info,
  Error,
}

/// Transient notification naming a completed or failed action
#[derive(Debug, Clone)]
pub struct Toast {
  pub message: String,
  pub level: ToastLevel,
  shown_at: Instant,
}

impl Toast {
  pub fn info(message: impl Into<String>) -> Self {
    Self::new(message, ToastLevel::Info)
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self::new(message, ToastLevel::Error)
  }

  fn new(message: impl Into<String>, level: ToastLevel) -> Self {
    Self {
      message: message.into(),
      level,
      shown_at: Instant::now(),
    }
  }

  pub fn is_expired(&self, now: Instant) -> bool {
    now.duration_since(self.shown_at) >= TOAST_TTL
  }
}

/// Stack of live toasts, newest at the bottom
#[derive(Debug, Default)]
pub struct Toasts {
  items: Vec<Toast>,
}

impl Toasts {
  pub fn push(&mut self, toast: Toast) {
    self.items.push(toast);
    // Keep the screen readable
    if self.items.len() > 3 {
      self.items.remove(0);
    }
  }

  /// Drop expired toasts. Returns `true` if any went away.
  pub fn prune(&mut self, now: Instant) -> bool {
    let before = self.items.len();
    self.items.retain(|t| !t.is_expired(now));
    self.items.len() != before
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let width = (area.width / 2).clamp(30, 60).min(area.width);
    let mut bottom = area.y + area.height;

    for toast in self.items.iter().rev() {
      let height = 3;
      if bottom < area.y + height {
        break;
      }
      bottom -= height;
      let toast_area = Rect::new(area.x + area.width - width, bottom, width, height);

      let color = match toast.level {
        ToastLevel::Info => Color::Green,
        ToastLevel::Error => Color::Red,
      };
      let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
      frame.render_widget(Clear, toast_area);
      frame.render_widget(
        Paragraph::new(toast.message.as_str())
          .block(block)
          .wrap(Wrap { trim: true }),
        toast_area,
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_toast_expires() {
    let toast = Toast::info("Saved");
    assert!(!toast.is_expired(Instant::now()));
    assert!(toast.is_expired(Instant::now() + TOAST_TTL));
  }

  #[test]
  fn test_keeps_three_newest() {
    let mut toasts = Toasts::default();
    for i in 0..5 {
      toasts.push(Toast::error(format!("failure {}", i)));
    }
    assert_eq!(toasts.items.len(), 3);
    assert_eq!(toasts.items[0].message, "failure 2");
  }

  #[test]
  fn test_prune_reports_change() {
    let mut toasts = Toasts::default();
    toasts.push(Toast::info("Deleted"));
    assert!(!toasts.prune(Instant::now()));
    assert!(toasts.prune(Instant::now() + TOAST_TTL));
  }
}
