use super::toast::Toast;
use std::future::Future;
use tokio::sync::oneshot;

/// A change running in the background, polled like a `Query`. At most one
/// per view; the view refuses new changes while one is in flight.
#[derive(Default)]
pub struct Mutation {
  running: Option<(String, oneshot::Receiver<Result<String, String>>)>,
}

impl Mutation {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_running(&self) -> bool {
    self.running.is_some()
  }

  /// Start `work`; `action` names it in the failure toast ("delete Ваза").
  /// On success `work`'s message becomes the toast.
  pub fn start<F>(&mut self, action: impl Into<String>, work: F)
  where
    F: Future<Output = Result<String, String>> + Send + 'static,
  {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(work.await);
    });
    self.running = Some((action.into(), rx));
  }

  /// Collect the outcome once it is in.
  pub fn poll(&mut self) -> Option<Toast> {
    let (action, rx) = self.running.as_mut()?;
    let outcome = match rx.try_recv() {
      Ok(outcome) => outcome,
      Err(oneshot::error::TryRecvError::Empty) => return None,
      Err(oneshot::error::TryRecvError::Closed) => Err("task ended without a result".to_string()),
    };
    let toast = match outcome {
      Ok(message) => Toast::info(message),
      Err(e) => Toast::error(format!("Failed to {}: {}", action, e)),
    };
    self.running = None;
    Some(toast)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ui::components::ToastLevel;
  use std::time::Duration;

  #[tokio::test]
  async fn test_success_toast_carries_message() {
    let mut mutation = Mutation::new();
    mutation.start("delete Ваза", async { Ok("Deleted Ваза".to_string()) });
    assert!(mutation.is_running());

    tokio::time::sleep(Duration::from_millis(10)).await;
    let toast = mutation.poll().unwrap();
    assert_eq!(toast.level, ToastLevel::Info);
    assert_eq!(toast.message, "Deleted Ваза");
    assert!(!mutation.is_running());
  }

  #[tokio::test]
  async fn test_failure_toast_names_action() {
    let mut mutation = Mutation::new();
    mutation.start("toggle Шкатулка", async { Err("record 4 not found".to_string()) });

    tokio::time::sleep(Duration::from_millis(10)).await;
    let toast = mutation.poll().unwrap();
    assert_eq!(toast.level, ToastLevel::Error);
    assert_eq!(toast.message, "Failed to toggle Шкатулка: record 4 not found");
  }

  #[test]
  fn test_idle_poll() {
    assert!(Mutation::new().poll().is_none());
  }
}
