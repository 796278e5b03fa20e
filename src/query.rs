//! Background work polled from the UI tick.
//!
//! A `Query<T>` owns a fetcher closure. `fetch()` spawns it on the tokio
//! runtime and `poll()` picks up the result without blocking the event loop.
//! Data from the last success stays readable while a refetch is in flight.
//!
//! ```ignore
//! let store = products.clone();
//! let mut query = Query::new(move || {
//!   let store = store.clone();
//!   async move {
//!     let mut store = store.lock().await;
//!     store.load(false).await.map_err(|e| e.to_string())?;
//!     Ok(store.collection().to_vec())
//!   }
//! });
//! query.fetch();
//!
//! // on tick
//! if query.poll() {
//!   // redraw
//! }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;

/// Where a query is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
  /// Never started
  Idle,
  Loading,
  Success,
  Error(String),
}

type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

pub struct Query<T> {
  status: QueryStatus,
  data: Option<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a query around `fetcher`, which is called once per fetch.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      status: QueryStatus::Idle,
      data: None,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  pub fn status(&self) -> &QueryStatus {
    &self.status
  }

  /// Data of the most recent success, kept through later loads and errors.
  pub fn data(&self) -> Option<&T> {
    self.data.as_ref()
  }

  pub fn is_loading(&self) -> bool {
    self.status == QueryStatus::Loading
  }

  pub fn error(&self) -> Option<&str> {
    match &self.status {
      QueryStatus::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Start fetching unless a fetch is already running.
  pub fn fetch(&mut self) {
    if self.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Start a new fetch; the result of any pending one is discarded.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.start_fetch();
  }

  /// Collect a finished fetch. Returns `true` when the status changed.
  pub fn poll(&mut self) -> bool {
    let Some(receiver) = &mut self.receiver else {
      return false;
    };

    let result = match receiver.try_recv() {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return false,
      Err(mpsc::error::TryRecvError::Disconnected) => Err("Task ended without a result".to_string()),
    };
    self.receiver = None;

    match result {
      Ok(data) => {
        self.data = Some(data);
        self.status = QueryStatus::Success;
      }
      Err(error) => self.status = QueryStatus::Error(error),
    }
    true
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.status = QueryStatus::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      // The receiver is gone when a refetch superseded this run
      let _ = tx.send(future.await);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("status", &self.status)
      .field("data", &self.data)
      .finish_non_exhaustive()
  }
}
