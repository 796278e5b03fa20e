use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Key press (releases and repeats are dropped)
  Key(KeyEvent),
  /// Terminal size changed; redraw
  Resize,
  /// Periodic tick for query polling and toast expiry
  Tick,
}

/// Merges terminal input and a tick timer into one channel
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
      let mut input = EventStream::new();
      let mut ticks = tokio::time::interval(tick_rate);

      loop {
        let event = tokio::select! {
          _ = ticks.tick() => Event::Tick,
          next = input.next() => match next {
            Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => Event::Key(key),
            Some(Ok(CrosstermEvent::Resize(_, _))) => Event::Resize,
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
              warn!(error = %e, "terminal input error");
              continue;
            }
            None => break,
          },
        };

        if tx.send(event).is_err() {
          break;
        }
      }
    });

    Self { rx }
  }

  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
