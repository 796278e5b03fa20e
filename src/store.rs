//! Cached collection store: the local, periodically resynchronized mirror
//! of one remote collection.
//!
//! 1. `load(false)` serves a fresh cache snapshot without touching the network
//! 2. Otherwise the remote source is listed and the snapshot rewritten
//! 3. Every successful mutation deletes the snapshot and forces a reload
//! 4. Failures leave the last-known-good collection in place
//!
//! Operations take `&mut self`, so one store never runs two of them at once.
//! Callers sharing a store across tasks wrap it in a `tokio::sync::Mutex`,
//! which queues overlapping loads in the order they were issued.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheSource, CacheStorage};
use crate::error::{FetchError, MutationError};
use crate::record::{Record, RecordFields};
use crate::source::RemoteSource;

/// Default time-to-live of a cached snapshot
pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

pub struct CachedCollectionStore<R: Record> {
  source: Arc<dyn RemoteSource<R>>,
  cache: Arc<dyn CacheStorage>,
  ttl: Duration,
  collection: Vec<R>,
  loading: bool,
  last_error: Option<String>,
}

impl<R: Record> CachedCollectionStore<R> {
  /// Create an empty store. Nothing is fetched until `load`.
  pub fn new(source: Arc<dyn RemoteSource<R>>, cache: Arc<dyn CacheStorage>) -> Self {
    Self {
      source,
      cache,
      ttl: Duration::seconds(DEFAULT_TTL_SECS),
      collection: Vec::new(),
      loading: false,
      last_error: None,
    }
  }

  /// Set how long a cached snapshot stays fresh.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  /// Records in server order, as of the last successful load.
  pub fn collection(&self) -> &[R] {
    &self.collection
  }

  pub fn get(&self, id: u64) -> Option<&R> {
    self.collection.iter().find(|r| r.id() == id)
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  /// Message of the most recent failed load, cleared by the next success.
  pub fn last_error(&self) -> Option<&str> {
    self.last_error.as_deref()
  }

  /// Replace the collection from a fresh snapshot, or from the remote source
  /// when forced, stale or missing.
  pub async fn load(&mut self, force_refresh: bool) -> Result<CacheSource, FetchError> {
    self.loading = true;

    if !force_refresh {
      if let Some(entry) = self.read_entry() {
        if entry.is_fresh(Utc::now(), self.ttl) {
          debug!(
            entity = R::entity_type(),
            count = entry.data.len(),
            "loaded from cache"
          );
          self.collection = entry.data;
          self.loading = false;
          return Ok(CacheSource::CacheFresh);
        }
        debug!(entity = R::entity_type(), "cache entry is stale");
      }
    }

    let result = self.source.list().await;
    self.loading = false;

    match result {
      Ok(records) => {
        debug!(
          entity = R::entity_type(),
          count = records.len(),
          "loaded from remote"
        );
        self.write_entry(&CacheEntry::new(records.clone(), Utc::now()));
        self.collection = records;
        self.last_error = None;
        Ok(CacheSource::Network)
      }
      Err(e) => {
        warn!(entity = R::entity_type(), error = %e, "failed to load collection");
        self.last_error = Some(e.to_string());
        Err(e)
      }
    }
  }

  /// Create a record remotely, then resynchronize.
  pub async fn create(&mut self, fields: R::Fields) -> Result<R, MutationError> {
    let record = self.source.create(&fields).await?;
    info!(entity = R::entity_type(), id = record.id(), "created");
    self.resync().await;
    Ok(record)
  }

  /// Replace a record's fields remotely, then resynchronize.
  pub async fn update(&mut self, id: u64, fields: R::Fields) -> Result<(), MutationError> {
    self.source.update(id, &fields).await?;
    info!(entity = R::entity_type(), id, "updated");
    self.resync().await;
    Ok(())
  }

  /// Delete a record remotely, then resynchronize. Confirmation is the
  /// caller's job.
  pub async fn delete(&mut self, id: u64) -> Result<(), MutationError> {
    self.source.delete(id).await?;
    info!(entity = R::entity_type(), id, "deleted");
    self.resync().await;
    Ok(())
  }

  /// Flip the availability of the in-memory record `id`, resubmitting all
  /// its other fields. Returns the new availability.
  ///
  /// The in-memory copy may lag the remote source between refreshes; an id
  /// missing here is `NotFound` even if it exists remotely.
  pub async fn toggle_availability(&mut self, id: u64) -> Result<bool, MutationError> {
    let record = self.get(id).ok_or(MutationError::NotFound { id })?;
    let available = !record.is_available();
    let mut fields = record.fields();
    fields.set_available(available);

    self.update(id, fields).await?;
    Ok(available)
  }

  /// Restore the source's initial collection, then resynchronize.
  pub async fn reset(&mut self, secret: &str) -> Result<String, MutationError> {
    let summary = self.source.reset(secret).await?;
    info!(entity = R::entity_type(), summary = %summary, "collection reset");
    self.resync().await;
    Ok(summary)
  }

  /// Drop the cached snapshot so the next `load` goes to the remote source.
  pub fn invalidate(&self) {
    if let Err(e) = self.cache.delete(R::collection_key()) {
      warn!(entity = R::entity_type(), error = %e, "failed to invalidate cache");
    }
  }

  /// After a successful mutation: invalidate and force a reload. A failed
  /// reload keeps the previous collection and is reported via `last_error`.
  async fn resync(&mut self) {
    self.invalidate();
    if let Err(e) = self.load(true).await {
      warn!(entity = R::entity_type(), error = %e, "refresh after change failed");
    }
  }

  fn read_entry(&self) -> Option<CacheEntry<R>> {
    let raw = match self.cache.read(R::collection_key()) {
      Ok(raw) => raw?,
      Err(e) => {
        warn!(entity = R::entity_type(), error = %e, "failed to read cache");
        return None;
      }
    };

    match serde_json::from_str(&raw) {
      Ok(entry) => Some(entry),
      Err(e) => {
        warn!(entity = R::entity_type(), error = %e, "discarding unreadable cache entry");
        None
      }
    }
  }

  fn write_entry(&self, entry: &CacheEntry<R>) {
    let raw = match serde_json::to_string(entry) {
      Ok(raw) => raw,
      Err(e) => {
        warn!(entity = R::entity_type(), error = %e, "failed to serialize cache entry");
        return;
      }
    };

    if let Err(e) = self.cache.write(R::collection_key(), &raw) {
      warn!(entity = R::entity_type(), error = %e, "failed to write cache");
    }
  }
}
