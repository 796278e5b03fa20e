use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::ui::components::Toast;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  None,
  /// Pop current view from stack (go back); popping the root quits
  Pop,
  /// Show a notification
  Notify(Toast),
}

/// Trait for view behavior
///
/// Views own their prompts and background work and return actions for the
/// App to execute. Data loads and mutations run as `Query<T>`s polled in
/// `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// True while a prompt inside the view takes all keys, so the App must
  /// not open the command palette on `:`.
  fn captures_input(&self) -> bool {
    false
  }

  /// Poll background work; a finished mutation reports itself as a toast.
  fn tick(&mut self) -> Option<Toast> {
    None
  }

  /// Get keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
