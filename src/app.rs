use crate::config::SourceKind;
use crate::content::{NewsItem, VideoItem};
use crate::event::{Event, EventHandler};
use crate::shop::Shop;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult, Toast, Toasts};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{CatalogView, FeedView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// `:` command palette, owned here so every view gets it
  command: CommandInput,

  toasts: Toasts,

  shop: Shop,

  should_quit: bool,
}

impl App {
  pub fn new(shop: Shop) -> Self {
    let root = CatalogView::new(shop.products.clone(), shop.admin.clone());
    Self {
      view_stack: vec![Box::new(root)],
      command: CommandInput::new(),
      toasts: Toasts::default(),
      shop,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(200));
    info!("tui started");

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    info!("tui stopped");
    Ok(())
  }

  fn tick(&mut self) {
    for view in self.view_stack.iter_mut() {
      if let Some(toast) = view.tick() {
        self.toasts.push(toast);
      }
    }
    self.toasts.prune(Instant::now());
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let view_captures = self.current_view().map(|v| v.captures_input()).unwrap_or(false);
    if !view_captures {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(cmd)) => {
          self.execute_command(&cmd);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => return,
    };
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Notify(toast) => self.toasts.push(toast),
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    debug!(command = cmd, "command palette");
    let root: Box<dyn View> = match cmd {
      "catalog" => Box::new(CatalogView::new(
        self.shop.products.clone(),
        self.shop.admin.clone(),
      )),
      "news" => Box::new(FeedView::<NewsItem>::new(
        self.shop.news.clone(),
        self.shop.admin.clone(),
      )),
      "videos" => Box::new(FeedView::<VideoItem>::new(
        self.shop.videos.clone(),
        self.shop.admin.clone(),
      )),
      "quit" => {
        self.should_quit = true;
        return;
      }
      other => {
        self.toasts.push(Toast::error(format!("Unknown command: {}", other)));
        return;
      }
    };

    // Palette commands replace the whole stack
    self.view_stack.clear();
    self.view_stack.push(root);
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command
  }

  pub fn toasts(&self) -> &Toasts {
    &self.toasts
  }

  pub fn is_admin(&self) -> bool {
    self.shop.is_admin()
  }

  pub fn source_label(&self) -> &'static str {
    match self.shop.source {
      SourceKind::Remote => "remote",
      SourceKind::Static => "offline catalog",
    }
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}
