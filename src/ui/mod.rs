pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function: header, current view, footer, then overlays
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Current view
      Constraint::Length(1), // Breadcrumb
    ])
    .split(frame.area());

  let shortcuts = app.current_view().map(|v| v.shortcuts()).unwrap_or_default();
  renderfns::draw_header(frame, chunks[0], app.source_label(), app.is_admin(), &shortcuts);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  let hint = if app.command_input().is_active() {
    "Enter run, Esc cancel"
  } else {
    "Ctrl-C quit"
  };
  renderfns::draw_footer(frame, chunks[2], &app.breadcrumb(), Some(hint));

  app.command_input().render_overlay(frame, chunks[1]);
  app.toasts().render(frame, chunks[1]);
}

/// Keep the selection inside a list of `len` items
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}
