mod actions;
mod catalog;
mod feed;

pub use catalog::CatalogView;
pub use feed::FeedView;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cache::CacheSource;
use crate::query::Query;
use crate::record::Record;
use crate::shop::SharedStore;

/// A collection as a view last saw it
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
  pub records: Vec<R>,
  /// Served from the local cache rather than the remote source
  pub from_cache: bool,
  /// The load failed; `records` are from before it
  pub error: Option<String>,
}

/// Query loading `store`. Setting `force` makes the next run bypass the
/// local cache; the flag is cleared when read.
pub(crate) fn load_query<R: Record>(
  store: SharedStore<R>,
  force: Arc<AtomicBool>,
) -> Query<Snapshot<R>> {
  Query::new(move || {
    let store = store.clone();
    let force_refresh = force.swap(false, Ordering::SeqCst);
    async move {
      let mut store = store.lock().await;
      let result = store.load(force_refresh).await;
      Ok(Snapshot {
        records: store.collection().to_vec(),
        from_cache: matches!(result, Ok(CacheSource::CacheFresh)),
        error: result.err().map(|e| e.to_string()),
      })
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStorage;
  use crate::catalog::{Product, ProductFields};
  use crate::source::StaticSource;
  use crate::store::CachedCollectionStore;
  use std::time::Duration;

  #[tokio::test]
  async fn test_load_query_reports_cache_hits_and_forced_reloads() {
    let source = StaticSource::<Product>::new(vec![ProductFields {
      name: "Ваза".into(),
      price_text: "2 000 ₽".into(),
      price_num: Some(2000),
      ..Default::default()
    }]);
    let store: SharedStore<Product> = Arc::new(tokio::sync::Mutex::new(CachedCollectionStore::new(
      Arc::new(source),
      Arc::new(MemoryStorage::new()),
    )));
    let force = Arc::new(AtomicBool::new(false));
    let mut query = load_query(store, force.clone());

    query.fetch();
    tokio::time::sleep(Duration::from_millis(20)).await;
    query.poll();
    let first = query.data().unwrap();
    assert_eq!(first.records.len(), 1);
    assert!(!first.from_cache);

    query.refetch();
    tokio::time::sleep(Duration::from_millis(20)).await;
    query.poll();
    assert!(query.data().unwrap().from_cache);

    force.store(true, Ordering::SeqCst);
    query.refetch();
    tokio::time::sleep(Duration::from_millis(20)).await;
    query.poll();
    assert!(!query.data().unwrap().from_cache);
    assert!(!force.load(Ordering::SeqCst));
  }
}
