//! Admin gate for mutation features.
//!
//! This is a convenience gate, not security: the password lives in the same
//! local storage as the cache. It is kept as a SHA-256 digest so the file
//! does not hold it in plaintext.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::CacheStorage;
use crate::error::AdminError;

/// Local cache key holding the password digest
const PASSWORD_KEY: &str = "admin_password";

/// Minimum length of a new admin password
pub const MIN_PASSWORD_LEN: usize = 6;

/// Capability deciding whether admin-only features are shown.
pub trait AdminSession: Send + Sync {
  /// Elevate when `secret` matches the admin password.
  fn try_elevate(&mut self, secret: &str) -> bool;

  fn is_admin(&self) -> bool;

  fn drop_privileges(&mut self);
}

/// Admin session checking against a password digest in local storage,
/// falling back to a configured default.
pub struct LocalAdminSession {
  storage: Arc<dyn CacheStorage>,
  default_digest: String,
  elevated: bool,
}

impl LocalAdminSession {
  pub fn new(storage: Arc<dyn CacheStorage>, default_password: &str) -> Self {
    Self {
      storage,
      default_digest: digest(default_password),
      elevated: false,
    }
  }

  fn current_digest(&self) -> String {
    match self.storage.read(PASSWORD_KEY) {
      Ok(Some(stored)) => stored,
      Ok(None) => self.default_digest.clone(),
      Err(e) => {
        warn!(error = %e, "failed to read admin password, using default");
        self.default_digest.clone()
      }
    }
  }

  /// Replace the admin password. Requires an elevated session.
  pub fn change_password(&mut self, new: &str, confirm: &str) -> Result<(), AdminError> {
    if !self.elevated {
      return Err(AdminError::NotElevated);
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
      return Err(AdminError::TooShort {
        min: MIN_PASSWORD_LEN,
      });
    }
    if new != confirm {
      return Err(AdminError::Mismatch);
    }

    self
      .storage
      .write(PASSWORD_KEY, &digest(new))
      .map_err(|e| AdminError::Storage(e.to_string()))?;
    info!("admin password changed");
    Ok(())
  }
}

impl AdminSession for LocalAdminSession {
  fn try_elevate(&mut self, secret: &str) -> bool {
    self.elevated = digest(secret) == self.current_digest();
    if !self.elevated {
      warn!("admin login rejected");
    }
    self.elevated
  }

  fn is_admin(&self) -> bool {
    self.elevated
  }

  fn drop_privileges(&mut self) {
    self.elevated = false;
  }
}

fn digest(secret: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(secret.as_bytes());
  hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStorage;

  fn session() -> (LocalAdminSession, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (LocalAdminSession::new(storage.clone(), "admin2025"), storage)
  }

  #[test]
  fn test_default_password_elevates() {
    let (mut admin, _) = session();
    assert!(!admin.is_admin());
    assert!(admin.try_elevate("admin2025"));
    assert!(admin.is_admin());
  }

  #[test]
  fn test_wrong_password_drops_elevation() {
    let (mut admin, _) = session();
    admin.try_elevate("admin2025");
    assert!(!admin.try_elevate("guess"));
    assert!(!admin.is_admin());
  }

  #[test]
  fn test_change_password_requires_elevation() {
    let (mut admin, _) = session();
    assert_eq!(
      admin.change_password("newpass", "newpass"),
      Err(AdminError::NotElevated)
    );
  }

  #[test]
  fn test_change_password_rules() {
    let (mut admin, _) = session();
    admin.try_elevate("admin2025");
    assert_eq!(
      admin.change_password("short", "short"),
      Err(AdminError::TooShort { min: 6 })
    );
    assert_eq!(
      admin.change_password("longer1", "longer2"),
      Err(AdminError::Mismatch)
    );
  }

  #[test]
  fn test_changed_password_persists_as_digest() {
    let (mut admin, storage) = session();
    admin.try_elevate("admin2025");
    admin.change_password("берёза77", "берёза77").unwrap();

    let stored = storage.read(PASSWORD_KEY).unwrap().unwrap();
    assert_ne!(stored, "берёза77");
    assert_eq!(stored.len(), 64);

    let mut fresh = LocalAdminSession::new(storage, "admin2025");
    assert!(!fresh.try_elevate("admin2025"));
    assert!(fresh.try_elevate("берёза77"));
  }

  #[test]
  fn test_drop_privileges() {
    let (mut admin, _) = session();
    admin.try_elevate("admin2025");
    admin.drop_privileges();
    assert!(!admin.is_admin());
  }
}
