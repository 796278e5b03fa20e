//! Typed errors for the collection store and its collaborators.
//!
//! Application plumbing (config, terminal setup, storage bootstrap) uses
//! `color_eyre::Result`; these types are what the store surfaces so callers
//! can tell a missing record from a rejected request.

use thiserror::Error;

/// Listing a collection failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
  #[error("request failed: {0}")]
  Transport(String),
  #[error("remote answered with status {status}")]
  Status { status: u16 },
  #[error("unexpected response body: {0}")]
  Decode(String),
}

/// A create, update, delete or reset was not applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
  #[error("record {id} not found")]
  NotFound { id: u64 },
  #[error("admin secret rejected")]
  Forbidden,
  #[error("remote rejected the change with status {status}")]
  Rejected { status: u16 },
  #[error("request failed: {0}")]
  Transport(String),
  #[error("unexpected response body: {0}")]
  Decode(String),
  #[error("{0} is not supported by this source")]
  Unsupported(&'static str),
}

/// Form input that must not be submitted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
  #[error("{0} must not be empty")]
  Empty(&'static str),
}

#[derive(Debug, Error)]
pub enum UploadError {
  #[error("{0} is not an image (expected jpg, jpeg, png, gif or webp)")]
  NotAnImage(String),
  #[error("file is too large: {size} bytes (max {max})")]
  TooLarge { size: u64, max: u64 },
  #[error("failed to read {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("upload failed: {0}")]
  Transport(String),
  #[error("upload rejected with status {status}")]
  Rejected { status: u16 },
  #[error("unexpected upload response: {0}")]
  Decode(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdminError {
  #[error("admin mode is required")]
  NotElevated,
  #[error("password must be at least {min} characters")]
  TooShort { min: usize },
  #[error("passwords do not match")]
  Mismatch,
  #[error("failed to persist password: {0}")]
  Storage(String),
}
