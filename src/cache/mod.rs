//! Local caching of whole collections.
//!
//! This module provides the durable side of the collection store:
//! - One timestamped snapshot per collection, replaced wholesale
//! - Freshness decided by a TTL against the snapshot timestamp
//! - String key-value backends (SQLite, memory, no-op)

mod storage;
mod traits;

pub use storage::{CacheStorage, MemoryStorage, NoopStorage, SqliteStorage};
pub use traits::{CacheEntry, CacheSource, Cacheable};
