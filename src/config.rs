use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::store::DEFAULT_TTL_SECS;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub source: SourceKind,
  #[serde(default)]
  pub endpoints: EndpointsConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub admin: AdminConfig,
  #[serde(default)]
  pub log: LogConfig,
}

/// Where collections come from
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
  /// HTTP endpoints (the configured `endpoints`)
  Remote,
  /// Bundled catalog held in memory; nothing leaves the machine
  #[default]
  Static,
}

/// Base URLs of the remote endpoints. All are required for `source: remote`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointsConfig {
  pub products: Option<String>,
  pub news: Option<String>,
  pub videos: Option<String>,
  pub upload_image: Option<String>,
  pub reset_products: Option<String>,
}

impl EndpointsConfig {
  /// Parse a configured endpoint, naming it in the error when missing.
  pub fn url(&self, name: &str, value: &Option<String>) -> Result<Url> {
    let raw = value
      .as_deref()
      .ok_or_else(|| eyre!("endpoints.{} is required for the remote source", name))?;
    Url::parse(raw).map_err(|e| eyre!("Invalid endpoints.{} URL {}: {}", name, raw, e))
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Seconds a cached collection stays fresh; 0 disables caching
  #[serde(default = "default_ttl_secs")]
  pub ttl_secs: u64,
  /// SQLite file (default: $XDG_DATA_HOME/woodshop/cache.db)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_secs: default_ttl_secs(),
      path: None,
    }
  }
}

fn default_ttl_secs() -> u64 {
  DEFAULT_TTL_SECS as u64
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
  /// Password used until one is set with `admin passwd`
  #[serde(default = "default_admin_password")]
  pub default_password: String,
  /// Secret accepted by the static source's reset
  pub reset_secret: Option<String>,
}

impl Default for AdminConfig {
  fn default() -> Self {
    Self {
      default_password: default_admin_password(),
      reset_secret: None,
    }
  }
}

fn default_admin_password() -> String {
  "admin2025".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Filter used when RUST_LOG is not set
  #[serde(default = "default_log_level")]
  pub level: String,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./woodshop.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/woodshop/config.yaml
  ///
  /// Without any file the built-in defaults apply (static source).
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("woodshop.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("woodshop").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  /// Get the admin password for CLI elevation from the environment.
  pub fn get_admin_password() -> Result<String> {
    std::env::var("WOODSHOP_ADMIN_PASSWORD").map_err(|_| {
      eyre!("Admin password not found. Set WOODSHOP_ADMIN_PASSWORD or pass --password.")
    })
  }

  /// Get the catalog reset secret from the environment.
  pub fn get_reset_secret() -> Result<String> {
    std::env::var("WOODSHOP_ADMIN_SECRET").map_err(|_| {
      eyre!("Reset secret not found. Set WOODSHOP_ADMIN_SECRET or pass --secret.")
    })
  }
}
