use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::error::{FetchError, MutationError};
use crate::record::Record;

use super::RemoteSource;

struct StaticState<R> {
  records: Vec<R>,
  next_id: u64,
}

/// In-process source of record seeded from bundled data.
///
/// Behaves like the endpoints: identifiers are assigned on create, new
/// records are listed first, and unknown identifiers are `NotFound`.
pub struct StaticSource<R: Record> {
  state: Mutex<StaticState<R>>,
  seed: Vec<R::Fields>,
  reset_secret: Option<String>,
}

impl<R: Record> StaticSource<R> {
  pub fn new(seed: Vec<R::Fields>) -> Self {
    let state = Self::seeded(&seed);
    Self {
      state: Mutex::new(state),
      seed,
      reset_secret: None,
    }
  }

  /// Accept resets presenting `secret`.
  pub fn with_reset_secret(mut self, secret: impl Into<String>) -> Self {
    self.reset_secret = Some(secret.into());
    self
  }

  fn seeded(seed: &[R::Fields]) -> StaticState<R> {
    // Newest first, like the endpoints' created_at DESC ordering
    let records: Vec<R> = seed
      .iter()
      .enumerate()
      .rev()
      .map(|(i, fields)| R::from_fields(i as u64 + 1, fields.clone()))
      .collect();
    StaticState {
      next_id: seed.len() as u64 + 1,
      records,
    }
  }

  fn lock(&self) -> Result<MutexGuard<'_, StaticState<R>>, String> {
    self.state.lock().map_err(|e| format!("Lock poisoned: {}", e))
  }
}

#[async_trait]
impl<R: Record> RemoteSource<R> for StaticSource<R> {
  async fn list(&self) -> Result<Vec<R>, FetchError> {
    let state = self.lock().map_err(FetchError::Transport)?;
    Ok(state.records.clone())
  }

  async fn create(&self, fields: &R::Fields) -> Result<R, MutationError> {
    let mut state = self.lock().map_err(MutationError::Transport)?;
    let record = R::from_fields(state.next_id, fields.clone());
    state.next_id += 1;
    state.records.insert(0, record.clone());
    Ok(record)
  }

  async fn update(&self, id: u64, fields: &R::Fields) -> Result<(), MutationError> {
    let mut state = self.lock().map_err(MutationError::Transport)?;
    let record = state
      .records
      .iter_mut()
      .find(|r| r.id() == id)
      .ok_or(MutationError::NotFound { id })?;
    *record = record.with_fields(fields.clone());
    Ok(())
  }

  async fn delete(&self, id: u64) -> Result<(), MutationError> {
    let mut state = self.lock().map_err(MutationError::Transport)?;
    let before = state.records.len();
    state.records.retain(|r| r.id() != id);
    if state.records.len() == before {
      return Err(MutationError::NotFound { id });
    }
    Ok(())
  }

  async fn reset(&self, secret: &str) -> Result<String, MutationError> {
    let expected = self
      .reset_secret
      .as_deref()
      .ok_or(MutationError::Unsupported("reset"))?;
    if secret != expected {
      return Err(MutationError::Forbidden);
    }

    let mut state = self.lock().map_err(MutationError::Transport)?;
    *state = Self::seeded(&self.seed);
    Ok(format!(
      "Catalog reset: {} records loaded",
      state.records.len()
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{seed_products, Product, ProductFields};

  fn fields(name: &str) -> ProductFields {
    ProductFields {
      name: name.into(),
      price_text: "1 000 ₽".into(),
      price_num: Some(1000),
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn test_seeded_newest_first() {
    let source = StaticSource::<Product>::new(vec![fields("first"), fields("second")]);
    let listed = source.list().await.unwrap();
    assert_eq!(
      listed.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
      vec!["second", "first"]
    );
    assert_eq!(listed[0].id, 2);
  }

  #[tokio::test]
  async fn test_create_assigns_next_id_and_lists_first() {
    let source = StaticSource::<Product>::new(vec![fields("old")]);
    let created = source.create(&fields("new")).await.unwrap();
    assert_eq!(created.id, 2);
    assert_eq!(source.list().await.unwrap()[0].id, 2);
  }

  #[tokio::test]
  async fn test_update_and_delete_unknown_id() {
    let source = StaticSource::<Product>::new(vec![fields("only")]);
    assert_eq!(
      source.update(99, &fields("x")).await,
      Err(MutationError::NotFound { id: 99 })
    );
    assert_eq!(
      source.delete(99).await,
      Err(MutationError::NotFound { id: 99 })
    );
  }

  #[tokio::test]
  async fn test_update_replaces_fields() {
    let source = StaticSource::<Product>::new(vec![fields("only")]);
    let mut changed = fields("renamed");
    changed.is_available = false;
    source.update(1, &changed).await.unwrap();
    let listed = source.list().await.unwrap();
    assert_eq!(listed[0].name, "renamed");
    assert!(!listed[0].available);
  }

  #[tokio::test]
  async fn test_reset_requires_secret() {
    let source = StaticSource::<Product>::new(seed_products().unwrap()).with_reset_secret("s3cret");
    source.delete(1).await.unwrap();

    assert_eq!(source.reset("wrong").await, Err(MutationError::Forbidden));
    assert_eq!(source.list().await.unwrap().len(), 21);

    let summary = source.reset("s3cret").await.unwrap();
    assert!(summary.contains("22"));
    assert_eq!(source.list().await.unwrap().len(), 22);
  }

  #[tokio::test]
  async fn test_reset_without_secret_is_unsupported() {
    let source = StaticSource::<Product>::new(vec![]);
    assert_eq!(
      source.reset("any").await,
      Err(MutationError::Unsupported("reset"))
    );
  }
}
