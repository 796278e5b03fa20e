use ratatui::prelude::*;

/// Truncate to `max_len` characters, ending in "..." when cut
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Dim records hidden from visitors (only admins see them)
pub fn availability_style(available: bool) -> Style {
  if available {
    Style::default()
  } else {
    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
  }
}

/// A `width` x `height` rect centered in `area`, clipped to it
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect::new(
    area.x + (area.width - width) / 2,
    area.y + (area.height - height) / 2,
    width,
    height,
  )
}
