//! Sources of record for collections.
//!
//! The store only talks to [`RemoteSource`]; whether records come from the
//! HTTP endpoints or from the bundled catalog is decided once, at startup.

mod api_types;
mod http;
mod static_source;
mod upload;

pub use http::HttpSource;
pub use static_source::StaticSource;
pub use upload::ImageUploader;

use async_trait::async_trait;

use crate::error::{FetchError, MutationError};
use crate::record::Record;

/// The four capabilities of a collection endpoint, plus an optional reset.
#[async_trait]
pub trait RemoteSource<R: Record>: Send + Sync {
  /// Full collection in server order.
  async fn list(&self) -> Result<Vec<R>, FetchError>;

  /// Create a record; the source assigns its identifier.
  async fn create(&self, fields: &R::Fields) -> Result<R, MutationError>;

  async fn update(&self, id: u64, fields: &R::Fields) -> Result<(), MutationError>;

  async fn delete(&self, id: u64) -> Result<(), MutationError>;

  /// Replace the whole collection with its initial contents.
  /// Returns a human-readable summary.
  async fn reset(&self, _secret: &str) -> Result<String, MutationError> {
    Err(MutationError::Unsupported("reset"))
  }
}
