//! Wires configuration into the stores the CLI and TUI share.

use color_eyre::{eyre::eyre, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

use crate::admin::{AdminSession, LocalAdminSession};
use crate::cache::{CacheStorage, MemoryStorage, NoopStorage, SqliteStorage};
use crate::catalog::{seed_products, Product};
use crate::config::{Config, SourceKind};
use crate::content::{NewsItem, VideoItem};
use crate::record::Record;
use crate::source::{HttpSource, ImageUploader, RemoteSource, StaticSource};
use crate::store::CachedCollectionStore;

/// A store shared between the event loop and background tasks.
/// Loads and mutations on one collection run one at a time.
pub type SharedStore<R> = Arc<tokio::sync::Mutex<CachedCollectionStore<R>>>;

pub type SharedAdmin = Arc<Mutex<LocalAdminSession>>;

pub struct Shop {
  pub source: SourceKind,
  pub products: SharedStore<Product>,
  pub news: SharedStore<NewsItem>,
  pub videos: SharedStore<VideoItem>,
  pub admin: SharedAdmin,
  /// Present only for the remote source with an upload endpoint
  pub uploader: Option<ImageUploader>,
}

impl Shop {
  pub fn build(config: &Config) -> Result<Self> {
    let path = match &config.cache.path {
      Some(path) => path.clone(),
      None => SqliteStorage::default_path()?,
    };
    let local: Arc<dyn CacheStorage> = Arc::new(SqliteStorage::open(&path)?);

    // The admin password lives in local storage even when caching is off.
    // The static source starts from its seed in every process, so its
    // snapshots must not outlive the process either.
    let cache: Arc<dyn CacheStorage> = match config.source {
      _ if config.cache.ttl_secs == 0 => Arc::new(NoopStorage),
      SourceKind::Static => Arc::new(MemoryStorage::new()),
      SourceKind::Remote => local.clone(),
    };
    let ttl = chrono::Duration::seconds(config.cache.ttl_secs as i64);

    let admin = LocalAdminSession::new(local, &config.admin.default_password);

    let shop = match config.source {
      SourceKind::Remote => {
        let client = reqwest::Client::builder()
          .timeout(Duration::from_secs(30))
          .build()
          .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;
        let endpoints = &config.endpoints;

        let mut products = HttpSource::<Product>::new(
          client.clone(),
          endpoints.url("products", &endpoints.products)?,
        );
        if endpoints.reset_products.is_some() {
          products =
            products.with_reset_endpoint(endpoints.url("reset_products", &endpoints.reset_products)?);
        }
        let news = HttpSource::<NewsItem>::new(client.clone(), endpoints.url("news", &endpoints.news)?);
        let videos =
          HttpSource::<VideoItem>::new(client.clone(), endpoints.url("videos", &endpoints.videos)?);

        let uploader = match &endpoints.upload_image {
          Some(_) => Some(ImageUploader::new(
            client,
            endpoints.url("upload_image", &endpoints.upload_image)?,
          )),
          None => None,
        };

        Self {
          source: config.source,
          products: shared(Arc::new(products), cache.clone(), ttl),
          news: shared(Arc::new(news), cache.clone(), ttl),
          videos: shared(Arc::new(videos), cache, ttl),
          admin: Arc::new(Mutex::new(admin)),
          uploader,
        }
      }
      SourceKind::Static => {
        let mut products = StaticSource::<Product>::new(seed_products()?);
        if let Some(secret) = reset_secret(config) {
          products = products.with_reset_secret(secret);
        }

        Self {
          source: config.source,
          products: shared(Arc::new(products), cache.clone(), ttl),
          news: shared(Arc::new(StaticSource::<NewsItem>::new(Vec::new())), cache.clone(), ttl),
          videos: shared(Arc::new(StaticSource::<VideoItem>::new(Vec::new())), cache, ttl),
          admin: Arc::new(Mutex::new(admin)),
          uploader: None,
        }
      }
    };

    info!(source = ?config.source, cache = %path.display(), "storefront ready");
    Ok(shop)
  }

  pub fn is_admin(&self) -> bool {
    is_admin(&self.admin)
  }
}

/// Whether the shared session is elevated; a poisoned lock counts as not.
pub fn is_admin(admin: &SharedAdmin) -> bool {
  admin.lock().map(|a| a.is_admin()).unwrap_or(false)
}

fn shared<R: Record>(
  source: Arc<dyn RemoteSource<R>>,
  cache: Arc<dyn CacheStorage>,
  ttl: chrono::Duration,
) -> SharedStore<R> {
  Arc::new(tokio::sync::Mutex::new(
    CachedCollectionStore::new(source, cache).with_ttl(ttl),
  ))
}

fn reset_secret(config: &Config) -> Option<String> {
  config
    .admin
    .reset_secret
    .clone()
    .or_else(|| Config::get_reset_secret().ok())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::ProductFields;
  use crate::config::CacheConfig;

  fn static_config(dir: &tempfile::TempDir, ttl_secs: u64) -> Config {
    Config {
      cache: CacheConfig {
        ttl_secs,
        path: Some(dir.path().join("cache.db")),
      },
      ..Config::default()
    }
  }

  #[tokio::test]
  async fn test_static_shop_serves_bundled_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let shop = Shop::build(&static_config(&dir, 300)).unwrap();

    let mut products = shop.products.lock().await;
    products.load(false).await.unwrap();
    assert_eq!(products.collection().len(), 22);
    assert!(shop.uploader.is_none());
    assert!(!shop.is_admin());
  }

  #[tokio::test]
  async fn test_zero_ttl_keeps_admin_password_storage() {
    let dir = tempfile::tempdir().unwrap();
    let shop = Shop::build(&static_config(&dir, 0)).unwrap();
    {
      let mut admin = shop.admin.lock().unwrap();
      assert!(admin.try_elevate("admin2025"));
      admin.change_password("новый-пароль", "новый-пароль").unwrap();
    }

    let reopened = Shop::build(&static_config(&dir, 0)).unwrap();
    let mut admin = reopened.admin.lock().unwrap();
    assert!(admin.try_elevate("новый-пароль"));
  }

  #[tokio::test]
  async fn test_static_changes_do_not_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let created = {
      let shop = Shop::build(&static_config(&dir, 300)).unwrap();
      let mut products = shop.products.lock().await;
      products.load(false).await.unwrap();
      let fields = ProductFields {
        name: "Подсвечник из дуба".into(),
        price_text: "1 200 ₽".into(),
        price_num: Some(1200),
        ..Default::default()
      };
      let created = products.create(fields).await.unwrap();
      assert_eq!(products.collection().len(), 23);
      created.id
    };

    let reopened = Shop::build(&static_config(&dir, 300)).unwrap();
    let mut products = reopened.products.lock().await;
    products.load(false).await.unwrap();
    assert_eq!(products.collection().len(), 22);
    assert!(products.get(created).is_none());
    assert_eq!(
      products.toggle_availability(created).await.unwrap_err(),
      crate::error::MutationError::NotFound { id: created }
    );
  }

  #[test]
  fn test_remote_requires_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
      source: SourceKind::Remote,
      ..static_config(&dir, 300)
    };
    let err = Shop::build(&config).err().unwrap();
    assert!(err.to_string().contains("endpoints.products"));
  }
}
