use chrono::NaiveDateTime;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::actions::RecordActions;
use super::{load_query, Snapshot};
use crate::catalog::published;
use crate::content::{NewsItem, VideoItem};
use crate::query::{Query, QueryStatus};
use crate::record::Record;
use crate::shop::{SharedAdmin, SharedStore};
use crate::ui::components::Toast;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{availability_style, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};

/// What a dated feed needs from its records
pub trait FeedEntry: Record {
  /// Breadcrumb and list title
  const TITLE: &'static str;

  fn headline(&self) -> &str;

  fn body(&self) -> Option<&str>;

  /// External link shown under the body
  fn link(&self) -> Option<&str>;

  fn date(&self) -> Option<NaiveDateTime>;
}

impl FeedEntry for NewsItem {
  const TITLE: &'static str = "Новости";

  fn headline(&self) -> &str {
    &self.title
  }

  fn body(&self) -> Option<&str> {
    Some(&self.content)
  }

  fn link(&self) -> Option<&str> {
    self.image_url.as_deref()
  }

  fn date(&self) -> Option<NaiveDateTime> {
    self.created_at
  }
}

impl FeedEntry for VideoItem {
  const TITLE: &'static str = "Видео";

  fn headline(&self) -> &str {
    &self.title
  }

  fn body(&self) -> Option<&str> {
    self.description.as_deref()
  }

  fn link(&self) -> Option<&str> {
    Some(&self.video_url)
  }

  fn date(&self) -> Option<NaiveDateTime> {
    self.created_at
  }
}

/// News or video feed, newest first
pub struct FeedView<R: FeedEntry> {
  query: Query<Snapshot<R>>,
  force: Arc<AtomicBool>,
  actions: RecordActions<R>,
  list_state: ListState,
}

impl<R: FeedEntry> FeedView<R> {
  pub fn new(store: SharedStore<R>, admin: SharedAdmin) -> Self {
    let force = Arc::new(AtomicBool::new(false));
    let mut query = load_query(store.clone(), force.clone());
    query.fetch();

    Self {
      query,
      force,
      actions: RecordActions::new(store, admin),
      list_state: ListState::default(),
    }
  }

  fn entries(&self) -> Vec<&R> {
    let records = self.query.data().map(|s| s.records.as_slice()).unwrap_or(&[]);
    published(records, self.actions.is_admin())
  }

  fn selected(&self) -> Option<R> {
    let index = self.list_state.selected()?;
    self.entries().get(index).map(|r| (*r).clone())
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let count = self.entries().len();
    ensure_valid_selection(&mut self.list_state, count);

    let title = match self.query.status() {
      QueryStatus::Loading => format!(" {} (loading...) ", R::TITLE),
      QueryStatus::Error(e) => format!(" {} (error: {}) ", R::TITLE, e),
      _ => match self.query.data().and_then(|s| s.error.as_deref()) {
        Some(e) => format!(" {} ({}, stale: {}) ", R::TITLE, count, e),
        None => format!(" {} ({}) ", R::TITLE, count),
      },
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if count == 0 && !self.query.is_loading() {
      let paragraph = Paragraph::new("Nothing published yet.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let width = (area.width as usize).saturating_sub(16).max(10);
    let items: Vec<ListItem> = self
      .entries()
      .iter()
      .map(|entry| {
        let date = entry
          .date()
          .map(|d| d.format("%d.%m.%Y").to_string())
          .unwrap_or_default();
        let line = Line::from(vec![
          Span::styled(format!("{:<11}", date), Style::default().fg(Color::DarkGray)),
          Span::raw(truncate(entry.headline(), width)),
        ]);
        ListItem::new(line).style(availability_style(entry.is_available()))
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));

    let Some(entry) = self.selected() else {
      frame.render_widget(block, area);
      return;
    };

    let mut lines = vec![Line::from(Span::styled(
      entry.headline().to_string(),
      Style::default().bold(),
    ))];
    if !entry.is_available() {
      lines.push(Line::from(Span::styled(
        "Не опубликовано (hidden from visitors)",
        Style::default().fg(Color::Red),
      )));
    }
    if let Some(body) = entry.body() {
      lines.push(Line::from(""));
      lines.extend(body.lines().map(|l| Line::from(l.to_string())));
    }
    if let Some(link) = entry.link() {
      lines.push(Line::from(""));
      lines.push(Line::from(Span::styled(
        link.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
      )));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }
}

impl<R: FeedEntry> View for FeedView<R> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if let Some(action) = self.actions.handle_overlay_key(key) {
      return action;
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => {
        self.force.store(true, Ordering::SeqCst);
        self.query.refetch();
      }
      KeyCode::Char('a') => return self.actions.toggle_admin(),
      KeyCode::Char('t') => {
        if let Some(entry) = self.selected() {
          return self.actions.toggle(&entry);
        }
      }
      KeyCode::Char('d') => {
        if let Some(entry) = self.selected() {
          return self.actions.delete(&entry);
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
      .split(area);

    self.render_list(frame, chunks[0]);
    self.render_detail(frame, chunks[1]);
    self.actions.render_overlays(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    R::TITLE.to_string()
  }

  fn captures_input(&self) -> bool {
    self.actions.captures_input()
  }

  fn tick(&mut self) -> Option<Toast> {
    self.query.poll();
    let toast = self.actions.tick()?;
    self.query.refetch();
    Some(toast)
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("r", "refresh").with_priority(30),
    ];
    if self.actions.is_admin() {
      shortcuts.push(ShortcutInfo::new("t", "publish").with_priority(40));
      shortcuts.push(ShortcutInfo::new("d", "delete").with_priority(41));
      shortcuts.push(ShortcutInfo::new("a", "logout").with_priority(50));
    } else {
      shortcuts.push(ShortcutInfo::new("a", "admin").with_priority(50));
    }
    shortcuts.push(ShortcutInfo::new("q", "back").with_priority(90));
    shortcuts
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::VideoFields;

  #[test]
  fn test_video_entry_links_to_video() {
    let video = VideoItem::from_fields(
      3,
      VideoFields {
        title: "Точим чашу".into(),
        description: None,
        video_url: "https://video.example/bowl".into(),
        thumbnail_url: None,
        is_published: true,
      },
    );
    assert_eq!(video.link(), Some("https://video.example/bowl"));
    assert_eq!(video.body(), None);
    assert_eq!(VideoItem::TITLE, "Видео");
  }
}
