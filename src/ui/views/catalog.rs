use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::actions::RecordActions;
use super::{load_query, Snapshot};
use crate::catalog::{visible, CategoryFilter, PriceRange, Product};
use crate::query::{Query, QueryStatus};
use crate::shop::{SharedAdmin, SharedStore};
use crate::ui::components::Toast;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{availability_style, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};

/// Product catalog with category and price filters
pub struct CatalogView {
  query: Query<Snapshot<Product>>,
  force: Arc<AtomicBool>,
  actions: RecordActions<Product>,
  category: CategoryFilter,
  price: PriceRange,
  list_state: ListState,
}

impl CatalogView {
  pub fn new(store: SharedStore<Product>, admin: SharedAdmin) -> Self {
    let force = Arc::new(AtomicBool::new(false));
    let mut query = load_query(store.clone(), force.clone());
    query.fetch();

    Self {
      query,
      force,
      actions: RecordActions::new(store, admin),
      category: CategoryFilter::All,
      price: PriceRange::default(),
      list_state: ListState::default(),
    }
  }

  fn products(&self) -> Vec<&Product> {
    let records = self
      .query
      .data()
      .map(|s| s.records.as_slice())
      .unwrap_or(&[]);
    visible(records, &self.category, &self.price, self.actions.is_admin())
  }

  fn selected(&self) -> Option<Product> {
    let index = self.list_state.selected()?;
    self.products().get(index).map(|p| (*p).clone())
  }

  fn refresh(&mut self) {
    self.force.store(true, Ordering::SeqCst);
    self.query.refetch();
  }

  fn title(&self, count: usize) -> String {
    let filters = format!("{} / {}", self.category.label(), self.price.label);
    match (self.query.status(), self.query.data()) {
      (QueryStatus::Loading, _) => format!(" Каталог [{}] (loading...) ", filters),
      (QueryStatus::Error(e), _) => format!(" Каталог [{}] (error: {}) ", filters, e),
      (_, Some(Snapshot { error: Some(e), .. })) => {
        format!(" Каталог [{}] ({}, stale: {}) ", filters, count, e)
      }
      (_, Some(Snapshot { from_cache: true, .. })) => format!(" Каталог [{}] ({}, cached) ", filters, count),
      _ => format!(" Каталог [{}] ({}) ", filters, count),
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let count = self.products().len();
    ensure_valid_selection(&mut self.list_state, count);

    let block = Block::default()
      .title(self.title(count))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if count == 0 && !self.query.is_loading() {
      let message = match self.query.data() {
        Some(Snapshot { error: Some(_), .. }) => "Failed to load the catalog. Press 'r' to retry.",
        _ => "Nothing matches these filters.",
      };
      let paragraph = Paragraph::new(message)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let name_width = (area.width as usize).saturating_sub(34).max(10);
    let items: Vec<ListItem> = self
      .products()
      .iter()
      .map(|product| {
        let line = Line::from(vec![
          Span::raw(format!("{:<w$}", truncate(&product.name, name_width), w = name_width)),
          Span::raw(" "),
          Span::styled(
            format!("{:<12}", truncate(&product.category, 12)),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(
            format!("{:>14}", product.price_label()),
            Style::default().fg(Color::Yellow),
          ),
        ]);
        ListItem::new(line).style(availability_style(product.available))
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Товар ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));

    let Some(product) = self.selected() else {
      frame.render_widget(block, area);
      return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
      Line::from(Span::styled(product.name.clone(), Style::default().bold())),
      Line::from(""),
      Line::from(vec![Span::styled("Цена:      ", label), Span::raw(product.price_label())]),
      Line::from(vec![Span::styled("Категория: ", label), Span::raw(product.category.clone())]),
    ];
    if !product.available {
      lines.push(Line::from(Span::styled(
        "Нет в наличии (hidden from visitors)",
        Style::default().fg(Color::Red),
      )));
    }
    if let Some(url) = &product.image_url {
      lines.push(Line::from(vec![Span::styled("Фото:      ", label), Span::raw(url.clone())]));
    }
    if let Some(description) = &product.description {
      lines.push(Line::from(""));
      lines.push(Line::from(description.clone()));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }
}

impl View for CatalogView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if let Some(action) = self.actions.handle_overlay_key(key) {
      return action;
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('c') => {
        self.category = self.category.next();
        self.list_state.select(Some(0));
      }
      KeyCode::Char('p') => {
        self.price = self.price.next();
        self.list_state.select(Some(0));
      }
      KeyCode::Char('r') => self.refresh(),
      KeyCode::Char('a') => return self.actions.toggle_admin(),
      KeyCode::Char('t') => {
        if let Some(product) = self.selected() {
          return self.actions.toggle(&product);
        }
      }
      KeyCode::Char('d') => {
        if let Some(product) = self.selected() {
          return self.actions.delete(&product);
        }
      }
      KeyCode::Char('R') => return self.actions.reset(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
      .split(area);

    self.render_list(frame, chunks[0]);
    self.render_detail(frame, chunks[1]);
    self.actions.render_overlays(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Каталог".to_string()
  }

  fn captures_input(&self) -> bool {
    self.actions.captures_input()
  }

  fn tick(&mut self) -> Option<Toast> {
    self.query.poll();
    let toast = self.actions.tick()?;
    // The store reloaded after the change; pick up its collection
    self.query.refetch();
    Some(toast)
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("c", "category").with_priority(20),
      ShortcutInfo::new("p", "price").with_priority(21),
      ShortcutInfo::new("r", "refresh").with_priority(30),
    ];
    if self.actions.is_admin() {
      shortcuts.extend([
        ShortcutInfo::new("t", "toggle").with_priority(40),
        ShortcutInfo::new("d", "delete").with_priority(41),
        ShortcutInfo::new("R", "reset").with_priority(42),
        ShortcutInfo::new("a", "logout").with_priority(50),
      ]);
    } else {
      shortcuts.push(ShortcutInfo::new("a", "admin").with_priority(50));
    }
    shortcuts.push(ShortcutInfo::new("q", "quit").with_priority(90));
    shortcuts
  }
}
