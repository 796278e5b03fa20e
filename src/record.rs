//! Shared shape of everything the storefront lists: products, news, videos.

use serde::{Serialize, Serializer};

use crate::cache::Cacheable;
use crate::error::ValidationError;

/// Editable part of a record, submitted on create and update.
pub trait RecordFields: Clone + Send + Sync + Serialize + 'static {
  /// Reject input the remote source would refuse. Called by the edges
  /// (CLI, TUI) before submission, not by the store.
  fn validate(&self) -> Result<(), ValidationError>;

  /// Set the availability (or publication) flag.
  fn set_available(&mut self, available: bool);
}

/// A listed entity with a remote-assigned, immutable identifier.
pub trait Record: Cacheable {
  type Fields: RecordFields;

  fn id(&self) -> u64;

  /// Whether non-admin visitors may see this record.
  fn is_available(&self) -> bool;

  /// Current editable values, for resubmission.
  fn fields(&self) -> Self::Fields;

  /// Short human label used in notifications.
  fn label(&self) -> &str;

  /// Build a record the way a source of record would after a create.
  fn from_fields(id: u64, fields: Self::Fields) -> Self;

  /// Build the updated version of this record.
  fn with_fields(&self, fields: Self::Fields) -> Self {
    Self::from_fields(self.id(), fields)
  }
}

/// Serialize a missing optional text as an empty string; the endpoints
/// strip incoming text and treat "" as absent.
pub(crate) fn empty_if_none<S: Serializer>(
  value: &Option<String>,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(value.as_deref().unwrap_or(""))
}

/// Treat whitespace-only input as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    Err(ValidationError::Empty(field))
  } else {
    Ok(())
  }
}

pub(crate) fn default_true() -> bool {
  true
}
