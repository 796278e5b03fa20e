//! Core traits and types for the caching system.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Trait for records whose whole collection can be cached.
///
/// A collection is cached as a single snapshot under a fixed key, so
/// implementors only name where their snapshot lives.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Local cache key holding the collection snapshot (e.g., "products_cache")
  fn collection_key() -> &'static str;

  /// Entity type name for logs (e.g., "product")
  fn entity_type() -> &'static str;
}

/// Snapshot of a full collection plus the moment it was captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
  pub data: Vec<T>,
  pub timestamp: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
  pub fn new(data: Vec<T>, timestamp: DateTime<Utc>) -> Self {
    Self { data, timestamp }
  }

  /// An entry is fresh while `now - timestamp < ttl`.
  pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
    now - self.timestamp < ttl
  }
}

/// Indicates where loaded data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from the remote source
  Network,
  /// Snapshot from the local cache, still within its TTL
  CacheFresh,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_entry_fresh_before_ttl() {
    let now = Utc::now();
    let entry = CacheEntry::new(vec![1, 2, 3], now - Duration::minutes(4));
    assert!(entry.is_fresh(now, Duration::minutes(5)));
  }

  #[test]
  fn test_entry_stale_at_exact_ttl() {
    let now = Utc::now();
    let entry = CacheEntry::new(vec![1], now - Duration::minutes(5));
    assert!(!entry.is_fresh(now, Duration::minutes(5)));
  }

  #[test]
  fn test_entry_round_trips_through_json() {
    let entry = CacheEntry::new(vec!["a".to_string()], Utc::now());
    let json = serde_json::to_string(&entry).unwrap();
    let back: CacheEntry<String> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.data, entry.data);
    assert_eq!(back.timestamp, entry.timestamp);
  }
}
