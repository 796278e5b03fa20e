use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::admin::AdminSession;
use crate::record::Record;
use crate::shop::{self, SharedAdmin, SharedStore};
use crate::ui::components::{Confirm, ConfirmEvent, KeyResult, Mutation, Prompt, PromptEvent, Toast};
use crate::ui::view::ViewAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ask {
  AdminPassword,
  ResetSecret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Guarded {
  Delete { id: u64, label: String },
  Reset,
}

/// Admin login and the mutations a collection view offers, with their
/// prompts and confirmations.
pub struct RecordActions<R: Record> {
  store: SharedStore<R>,
  admin: SharedAdmin,
  prompt: Prompt<Ask>,
  confirm: Confirm<Guarded>,
  mutation: Mutation,
}

impl<R: Record> RecordActions<R> {
  pub fn new(store: SharedStore<R>, admin: SharedAdmin) -> Self {
    Self {
      store,
      admin,
      prompt: Prompt::new(),
      confirm: Confirm::new(),
      mutation: Mutation::new(),
    }
  }

  pub fn is_admin(&self) -> bool {
    shop::is_admin(&self.admin)
  }

  pub fn is_busy(&self) -> bool {
    self.mutation.is_running()
  }

  /// True while a prompt or confirmation is open
  pub fn captures_input(&self) -> bool {
    self.prompt.is_active() || self.confirm.is_active()
  }

  /// Route a key to an open overlay. `None` means no overlay took it.
  pub fn handle_overlay_key(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(guarded)) => return Some(self.confirmed(guarded)),
      KeyResult::Event(ConfirmEvent::Cancelled) | KeyResult::Handled => return Some(ViewAction::None),
      KeyResult::NotHandled => {}
    }

    match self.prompt.handle_key(key) {
      KeyResult::Event(PromptEvent::Submitted(ask, value)) => Some(self.submitted(ask, value)),
      KeyResult::Event(PromptEvent::Cancelled) | KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  /// Log in (asks for the password) or, when elevated, log out.
  pub fn toggle_admin(&mut self) -> ViewAction {
    if self.is_admin() {
      if let Ok(mut admin) = self.admin.lock() {
        admin.drop_privileges();
      }
      return ViewAction::Notify(Toast::info("Left admin mode"));
    }
    self.prompt.show(Ask::AdminPassword, "Admin password", true);
    ViewAction::None
  }

  pub fn toggle(&mut self, record: &R) -> ViewAction {
    if let Some(refusal) = self.refusal() {
      return refusal;
    }

    let store = self.store.clone();
    let id = record.id();
    let label = record.label().to_string();
    self.mutation.start(format!("toggle {}", label), async move {
      let available = store
        .lock()
        .await
        .toggle_availability(id)
        .await
        .map_err(|e| e.to_string())?;
      let state = if available { "visible" } else { "hidden" };
      Ok(format!("{} is now {}", label, state))
    });
    ViewAction::None
  }

  pub fn delete(&mut self, record: &R) -> ViewAction {
    if let Some(refusal) = self.refusal() {
      return refusal;
    }

    let label = record.label().to_string();
    self.confirm.show(
      Guarded::Delete {
        id: record.id(),
        label: label.clone(),
      },
      format!("Delete \"{}\"?", label),
    );
    ViewAction::None
  }

  pub fn reset(&mut self) -> ViewAction {
    if let Some(refusal) = self.refusal() {
      return refusal;
    }

    self.confirm.show(
      Guarded::Reset,
      format!("Replace every {} with the initial collection?", R::entity_type()),
    );
    ViewAction::None
  }

  /// Outcome of a finished mutation. The store has already reloaded, so
  /// the caller only needs to refetch its view of it.
  pub fn tick(&mut self) -> Option<Toast> {
    self.mutation.poll()
  }

  pub fn render_overlays(&self, frame: &mut Frame, area: Rect) {
    self.confirm.render_overlay(frame, area);
    self.prompt.render_overlay(frame, area);
  }

  fn refusal(&self) -> Option<ViewAction> {
    if !self.is_admin() {
      return Some(ViewAction::Notify(Toast::error("Admin only: press a to log in")));
    }
    if self.is_busy() {
      return Some(ViewAction::Notify(Toast::error("Another change is still running")));
    }
    None
  }

  fn confirmed(&mut self, guarded: Guarded) -> ViewAction {
    match guarded {
      Guarded::Delete { id, label } => {
        let store = self.store.clone();
        self.mutation.start(format!("delete {}", label), async move {
          store.lock().await.delete(id).await.map_err(|e| e.to_string())?;
          Ok(format!("Deleted {}", label))
        });
        ViewAction::None
      }
      Guarded::Reset => {
        self.prompt.show(Ask::ResetSecret, "Reset secret", true);
        ViewAction::None
      }
    }
  }

  fn submitted(&mut self, ask: Ask, value: String) -> ViewAction {
    match ask {
      Ask::AdminPassword => {
        let elevated = self
          .admin
          .lock()
          .map(|mut admin| admin.try_elevate(&value))
          .unwrap_or(false);
        if elevated {
          ViewAction::Notify(Toast::info("Admin mode: hidden records shown"))
        } else {
          ViewAction::Notify(Toast::error("Wrong admin password"))
        }
      }
      Ask::ResetSecret => {
        let store = self.store.clone();
        self.mutation.start(format!("reset {}s", R::entity_type()), async move {
          store.lock().await.reset(&value).await.map_err(|e| e.to_string())
        });
        ViewAction::None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::admin::LocalAdminSession;
  use crate::cache::MemoryStorage;
  use crate::catalog::{Product, ProductFields};
  use crate::source::StaticSource;
  use crate::store::CachedCollectionStore;
  use crate::ui::components::ToastLevel;
  use crossterm::event::{KeyCode, KeyModifiers};
  use std::sync::{Arc, Mutex};
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_line(actions: &mut RecordActions<Product>, text: &str) -> Option<ViewAction> {
    for c in text.chars() {
      actions.handle_overlay_key(key(KeyCode::Char(c)));
    }
    actions.handle_overlay_key(key(KeyCode::Enter))
  }

  fn actions() -> (RecordActions<Product>, SharedStore<Product>) {
    let fields = ProductFields {
      name: "Конфетница".into(),
      price_text: "1 800 ₽".into(),
      price_num: Some(1800),
      ..Default::default()
    };
    let source = StaticSource::<Product>::new(vec![fields]).with_reset_secret("s3cret");
    let cache = Arc::new(MemoryStorage::new());
    let store: SharedStore<Product> = Arc::new(tokio::sync::Mutex::new(CachedCollectionStore::new(
      Arc::new(source),
      cache.clone(),
    )));
    let admin = Arc::new(Mutex::new(LocalAdminSession::new(cache, "admin2025")));
    (RecordActions::new(store.clone(), admin), store)
  }

  fn notified_level(action: Option<ViewAction>) -> Option<ToastLevel> {
    match action {
      Some(ViewAction::Notify(toast)) => Some(toast.level),
      _ => None,
    }
  }

  async fn settle(actions: &mut RecordActions<Product>) -> Toast {
    for _ in 0..50 {
      if let Some(toast) = actions.tick() {
        return toast;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("mutation did not finish");
  }

  #[tokio::test]
  async fn test_mutations_require_admin() {
    let (mut actions, store) = actions();
    store.lock().await.load(false).await.unwrap();
    let product = store.lock().await.collection()[0].clone();

    match actions.toggle(&product) {
      ViewAction::Notify(toast) => assert_eq!(toast.level, ToastLevel::Error),
      _ => panic!("expected a refusal"),
    }
    assert!(!actions.is_busy());
  }

  #[tokio::test]
  async fn test_login_then_toggle() {
    let (mut actions, store) = actions();
    store.lock().await.load(false).await.unwrap();
    let product = store.lock().await.collection()[0].clone();

    actions.toggle_admin();
    assert!(actions.captures_input());
    assert_eq!(notified_level(type_line(&mut actions, "admin2025")), Some(ToastLevel::Info));
    assert!(actions.is_admin());

    actions.toggle(&product);
    let toast = settle(&mut actions).await;
    assert_eq!(toast.message, "Конфетница is now hidden");
    assert!(!store.lock().await.collection()[0].available);
  }

  #[tokio::test]
  async fn test_wrong_password_is_reported() {
    let (mut actions, _) = actions();
    actions.toggle_admin();
    assert_eq!(notified_level(type_line(&mut actions, "guess")), Some(ToastLevel::Error));
    assert!(!actions.is_admin());
  }

  #[tokio::test]
  async fn test_delete_needs_confirmation() {
    let (mut actions, store) = actions();
    store.lock().await.load(false).await.unwrap();
    let product = store.lock().await.collection()[0].clone();
    actions.toggle_admin();
    type_line(&mut actions, "admin2025");

    actions.delete(&product);
    actions.handle_overlay_key(key(KeyCode::Char('n')));
    assert!(!actions.is_busy());

    actions.delete(&product);
    actions.handle_overlay_key(key(KeyCode::Char('y')));
    let toast = settle(&mut actions).await;
    assert_eq!(toast.message, "Deleted Конфетница");
    assert!(store.lock().await.collection().is_empty());
  }

  #[tokio::test]
  async fn test_reset_with_wrong_secret_fails_with_named_action() {
    let (mut actions, store) = actions();
    store.lock().await.load(false).await.unwrap();
    actions.toggle_admin();
    type_line(&mut actions, "admin2025");

    actions.reset();
    actions.handle_overlay_key(key(KeyCode::Char('y')));
    assert!(actions.captures_input());
    type_line(&mut actions, "nope");

    let toast = settle(&mut actions).await;
    assert_eq!(toast.level, ToastLevel::Error);
    assert_eq!(toast.message, "Failed to reset products: admin secret rejected");
  }
}
