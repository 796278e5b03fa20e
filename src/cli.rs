//! One-shot subcommands: list and edit collections without the TUI.

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

use crate::admin::AdminSession;
use crate::cache::CacheSource;
use crate::catalog::{published, visible, CategoryFilter, PriceRange, Product, ProductFields};
use crate::config::{Config, SourceKind};
use crate::content::{NewsFields, NewsItem, VideoFields, VideoItem};
use crate::record::{Record, RecordFields};
use crate::shop::{SharedStore, Shop};

#[derive(Parser, Debug)]
#[command(name = "woodshop")]
#[command(about = "Catalog, news and videos of a handmade wood workshop, in the terminal")]
#[command(version)]
pub struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/woodshop/config.yaml)
  #[arg(short, long, global = true)]
  pub config: Option<PathBuf>,

  /// Override the configured data source
  #[arg(long, value_enum, global = true)]
  pub source: Option<SourceKind>,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Open the terminal UI (default)
  Tui,
  /// Browse and edit the product catalog
  #[command(subcommand)]
  Catalog(CatalogCommand),
  /// Browse and edit news posts
  #[command(subcommand)]
  News(NewsCommand),
  /// Browse and edit gallery videos
  #[command(subcommand)]
  Videos(VideoCommand),
  /// Admin account maintenance
  #[command(subcommand)]
  Admin(AdminCommand),
}

/// Elevation for admin-only operations
#[derive(ClapArgs, Debug, Default)]
pub struct AdminArgs {
  /// Admin password (default: $WOODSHOP_ADMIN_PASSWORD)
  #[arg(long)]
  pub password: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct ListArgs {
  /// Bypass the local cache
  #[arg(long)]
  pub refresh: bool,

  /// Include unavailable records (admin only)
  #[arg(long)]
  pub all: bool,

  #[command(flatten)]
  pub admin: AdminArgs,
}

#[derive(ClapArgs, Debug)]
pub struct TargetArgs {
  /// Record identifier
  pub id: u64,

  /// Skip the confirmation prompt
  #[arg(short, long)]
  pub yes: bool,

  #[command(flatten)]
  pub admin: AdminArgs,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
  /// List products matching the filters
  List {
    /// Category name, or "Все"/"all"
    #[arg(long, default_value = "Все")]
    category: String,

    /// Price range label or its index (0 = all prices)
    #[arg(long, default_value = "Все")]
    price: String,

    #[command(flatten)]
    list: ListArgs,
  },
  /// Add a product
  Add {
    #[command(flatten)]
    product: ProductArgs,

    #[command(flatten)]
    admin: AdminArgs,
  },
  /// Change fields of a product
  Edit {
    id: u64,

    #[command(flatten)]
    product: ProductArgs,

    #[command(flatten)]
    admin: AdminArgs,
  },
  /// Delete a product
  Delete(TargetArgs),
  /// Flip a product's availability
  Toggle(TargetArgs),
  /// Restore the initial catalog
  Reset {
    /// Reset secret (default: $WOODSHOP_ADMIN_SECRET)
    #[arg(long)]
    secret: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    #[command(flatten)]
    admin: AdminArgs,
  },
}

/// Product form; on edit only the given fields change
#[derive(ClapArgs, Debug, Default)]
pub struct ProductArgs {
  #[arg(long)]
  pub name: Option<String>,
  #[arg(long)]
  pub description: Option<String>,
  /// Display price, e.g. "2 500 ₽" or "По запросу"
  #[arg(long)]
  pub price_text: Option<String>,
  /// Numeric price used for filtering; 0 means on request
  #[arg(long)]
  pub price_num: Option<u32>,
  #[arg(long)]
  pub category: Option<String>,
  /// Local image to upload (remote source only)
  #[arg(long, conflicts_with = "image_url")]
  pub image: Option<PathBuf>,
  /// Already-hosted image URL
  #[arg(long)]
  pub image_url: Option<String>,
  /// Mark the product unavailable
  #[arg(long)]
  pub unavailable: bool,
}

#[derive(Subcommand, Debug)]
pub enum NewsCommand {
  List(ListArgs),
  Add {
    #[command(flatten)]
    post: NewsArgs,
    #[command(flatten)]
    admin: AdminArgs,
  },
  Edit {
    id: u64,
    #[command(flatten)]
    post: NewsArgs,
    #[command(flatten)]
    admin: AdminArgs,
  },
  Delete(TargetArgs),
  /// Publish or hide a post
  Toggle(TargetArgs),
}

#[derive(ClapArgs, Debug, Default)]
pub struct NewsArgs {
  #[arg(long)]
  pub title: Option<String>,
  #[arg(long)]
  pub content: Option<String>,
  #[arg(long)]
  pub image_url: Option<String>,
  /// Save without publishing
  #[arg(long)]
  pub draft: bool,
}

#[derive(Subcommand, Debug)]
pub enum VideoCommand {
  List(ListArgs),
  Add {
    #[command(flatten)]
    video: VideoArgs,
    #[command(flatten)]
    admin: AdminArgs,
  },
  Edit {
    id: u64,
    #[command(flatten)]
    video: VideoArgs,
    #[command(flatten)]
    admin: AdminArgs,
  },
  Delete(TargetArgs),
  /// Publish or hide a video
  Toggle(TargetArgs),
}

#[derive(ClapArgs, Debug, Default)]
pub struct VideoArgs {
  #[arg(long)]
  pub title: Option<String>,
  #[arg(long)]
  pub description: Option<String>,
  #[arg(long)]
  pub url: Option<String>,
  #[arg(long)]
  pub thumbnail_url: Option<String>,
  /// Save without publishing
  #[arg(long)]
  pub draft: bool,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
  /// Change the admin password (prompts for the new one twice)
  Passwd(AdminArgs),
}

pub async fn run(command: Command, shop: &Shop) -> Result<()> {
  match command {
    Command::Tui => Err(eyre!("The TUI is started from main")),
    Command::Catalog(cmd) => run_catalog(cmd, shop).await,
    Command::News(cmd) => run_news(cmd, shop).await,
    Command::Videos(cmd) => run_videos(cmd, shop).await,
    Command::Admin(AdminCommand::Passwd(admin)) => change_password(shop, admin),
  }
}

async fn run_catalog(cmd: CatalogCommand, shop: &Shop) -> Result<()> {
  match cmd {
    CatalogCommand::List {
      category,
      price,
      list,
    } => {
      let range = PriceRange::find(&price).ok_or_else(|| eyre!("Unknown price range: {}", price))?;
      let category = CategoryFilter::parse(&category);
      let is_admin = list.all && elevate(shop, list.admin)?;

      let mut store = shop.products.lock().await;
      load(&mut store, list.refresh).await?;
      let products = visible(store.collection(), &category, &range, is_admin);

      println!(
        "{} products ({} / {})",
        products.len(),
        category.label(),
        range.label
      );
      for product in products {
        println!("{}", product_line(product));
      }
      Ok(())
    }
    CatalogCommand::Add { product, admin } => {
      elevate(shop, admin)?;
      let mut fields = ProductFields::default();
      apply_product_args(shop, &mut fields, product).await?;
      fields.validate()?;

      let created = shop.products.lock().await.create(fields).await?;
      println!("Added product {}: {}", created.id, created.name);
      report_refresh(&shop.products).await;
      Ok(())
    }
    CatalogCommand::Edit { id, product, admin } => {
      elevate(shop, admin)?;
      let mut store = shop.products.lock().await;
      let mut fields = current_fields(&mut store, id).await?;
      apply_product_args(shop, &mut fields, product).await?;
      fields.validate()?;

      store.update(id, fields).await?;
      println!("Updated product {}", id);
      drop(store);
      report_refresh(&shop.products).await;
      Ok(())
    }
    CatalogCommand::Delete(target) => delete_record(shop, &shop.products, target).await,
    CatalogCommand::Toggle(target) => toggle_record(shop, &shop.products, target).await,
    CatalogCommand::Reset { secret, yes, admin } => {
      elevate(shop, admin)?;
      let secret = match secret {
        Some(secret) => secret,
        None => Config::get_reset_secret()?,
      };
      if !yes && !confirm("Replace the whole catalog with the initial products?")? {
        println!("Cancelled");
        return Ok(());
      }

      let summary = shop.products.lock().await.reset(&secret).await?;
      println!("{}", summary);
      report_refresh(&shop.products).await;
      Ok(())
    }
  }
}

async fn run_news(cmd: NewsCommand, shop: &Shop) -> Result<()> {
  match cmd {
    NewsCommand::List(list) => {
      list_feed(shop, &shop.news, list, |item: &NewsItem| {
        format!(
          "{:>4}  {}  {}{}",
          item.id,
          date_label(item.created_at),
          item.title,
          hidden_marker(item)
        )
      })
      .await
    }
    NewsCommand::Add { post, admin } => {
      elevate(shop, admin)?;
      let mut fields = NewsFields {
        title: String::new(),
        content: String::new(),
        image_url: None,
        is_published: true,
      };
      apply_news_args(&mut fields, post);
      fields.validate()?;

      let created = shop.news.lock().await.create(fields).await?;
      println!("Added post {}: {}", created.id, created.title);
      report_refresh(&shop.news).await;
      Ok(())
    }
    NewsCommand::Edit { id, post, admin } => {
      elevate(shop, admin)?;
      let mut store = shop.news.lock().await;
      let mut fields = current_fields(&mut store, id).await?;
      apply_news_args(&mut fields, post);
      fields.validate()?;

      store.update(id, fields).await?;
      println!("Updated post {}", id);
      drop(store);
      report_refresh(&shop.news).await;
      Ok(())
    }
    NewsCommand::Delete(target) => delete_record(shop, &shop.news, target).await,
    NewsCommand::Toggle(target) => toggle_record(shop, &shop.news, target).await,
  }
}

async fn run_videos(cmd: VideoCommand, shop: &Shop) -> Result<()> {
  match cmd {
    VideoCommand::List(list) => {
      list_feed(shop, &shop.videos, list, |item: &VideoItem| {
        format!(
          "{:>4}  {}  {}  <{}>{}",
          item.id,
          date_label(item.created_at),
          item.title,
          item.video_url,
          hidden_marker(item)
        )
      })
      .await
    }
    VideoCommand::Add { video, admin } => {
      elevate(shop, admin)?;
      let mut fields = VideoFields {
        title: String::new(),
        description: None,
        video_url: String::new(),
        thumbnail_url: None,
        is_published: true,
      };
      apply_video_args(&mut fields, video);
      fields.validate()?;

      let created = shop.videos.lock().await.create(fields).await?;
      println!("Added video {}: {}", created.id, created.title);
      report_refresh(&shop.videos).await;
      Ok(())
    }
    VideoCommand::Edit { id, video, admin } => {
      elevate(shop, admin)?;
      let mut store = shop.videos.lock().await;
      let mut fields = current_fields(&mut store, id).await?;
      apply_video_args(&mut fields, video);
      fields.validate()?;

      store.update(id, fields).await?;
      println!("Updated video {}", id);
      drop(store);
      report_refresh(&shop.videos).await;
      Ok(())
    }
    VideoCommand::Delete(target) => delete_record(shop, &shop.videos, target).await,
    VideoCommand::Toggle(target) => toggle_record(shop, &shop.videos, target).await,
  }
}

async fn list_feed<R: Record>(
  shop: &Shop,
  store: &SharedStore<R>,
  list: ListArgs,
  line: impl Fn(&R) -> String,
) -> Result<()> {
  let is_admin = list.all && elevate(shop, list.admin)?;
  let mut store = store.lock().await;
  load(&mut store, list.refresh).await?;

  let records = published(store.collection(), is_admin);
  if records.is_empty() {
    println!("Nothing published yet");
  }
  for record in records {
    println!("{}", line(record));
  }
  Ok(())
}

async fn delete_record<R: Record>(
  shop: &Shop,
  store: &SharedStore<R>,
  target: TargetArgs,
) -> Result<()> {
  elevate(shop, target.admin)?;
  let id = target.id;

  let mut guard = store.lock().await;
  load(&mut guard, false).await?;
  let label = guard
    .get(id)
    .map(|r| r.label().to_string())
    .unwrap_or_else(|| format!("#{}", id));

  let prompt = format!("Delete {} \"{}\"?", R::entity_type(), label);
  if !target.yes && !confirm(&prompt)? {
    println!("Cancelled");
    return Ok(());
  }

  guard.delete(id).await?;
  println!("Deleted {} {}", R::entity_type(), id);
  drop(guard);
  report_refresh(store).await;
  Ok(())
}

async fn toggle_record<R: Record>(
  shop: &Shop,
  store: &SharedStore<R>,
  target: TargetArgs,
) -> Result<()> {
  elevate(shop, target.admin)?;
  let id = target.id;

  let mut guard = store.lock().await;
  load(&mut guard, false).await?;
  let available = guard.toggle_availability(id).await?;
  println!(
    "{} {} is now {}",
    R::entity_type(),
    id,
    if available { "visible" } else { "hidden" }
  );
  drop(guard);
  report_refresh(store).await;
  Ok(())
}

/// Load, turning a failure into an error only when nothing is available.
async fn load<R: Record>(
  store: &mut crate::store::CachedCollectionStore<R>,
  refresh: bool,
) -> Result<()> {
  match store.load(refresh).await {
    Ok(CacheSource::CacheFresh) => {
      tracing::debug!(entity = R::entity_type(), "served from local cache");
      Ok(())
    }
    Ok(CacheSource::Network) => Ok(()),
    Err(e) => Err(eyre!("Failed to load {}: {}", R::entity_type(), e)),
  }
}

async fn current_fields<R: Record>(
  store: &mut crate::store::CachedCollectionStore<R>,
  id: u64,
) -> Result<R::Fields> {
  load(store, false).await?;
  store
    .get(id)
    .map(|r| r.fields())
    .ok_or_else(|| eyre!("{} {} not found", R::entity_type(), id))
}

/// Warn when the reload after a change failed; the change itself stands.
async fn report_refresh<R: Record>(store: &SharedStore<R>) {
  if let Some(error) = store.lock().await.last_error() {
    warn!(entity = R::entity_type(), error = %error, "showing data from before the change");
    eprintln!("Warning: change saved, but the refresh failed: {}", error);
  }
}

/// Elevate with the given or environment password. Returns `true` so
/// callers can gate on it.
fn elevate(shop: &Shop, args: AdminArgs) -> Result<bool> {
  let password = match args.password {
    Some(password) => password,
    None => Config::get_admin_password()?,
  };
  let mut admin = shop
    .admin
    .lock()
    .map_err(|e| eyre!("Lock poisoned: {}", e))?;
  if admin.try_elevate(&password) {
    Ok(true)
  } else {
    Err(eyre!("Admin password rejected"))
  }
}

fn change_password(shop: &Shop, args: AdminArgs) -> Result<()> {
  elevate(shop, args)?;
  let new = prompt_line("New password: ")?;
  let confirm = prompt_line("Repeat new password: ")?;

  let mut admin = shop
    .admin
    .lock()
    .map_err(|e| eyre!("Lock poisoned: {}", e))?;
  admin.change_password(&new, &confirm)?;
  println!("Admin password changed");
  Ok(())
}

async fn apply_product_args(shop: &Shop, fields: &mut ProductFields, args: ProductArgs) -> Result<()> {
  if let Some(name) = args.name {
    fields.name = name;
  }
  if let Some(description) = args.description {
    fields.description = Some(description);
  }
  if let Some(price_text) = args.price_text {
    fields.price_text = price_text;
  }
  if let Some(price_num) = args.price_num {
    fields.price_num = Some(price_num);
  }
  if let Some(category) = args.category {
    fields.category = category;
  }
  if let Some(url) = args.image_url {
    fields.image_url = Some(url);
  }
  if let Some(path) = args.image {
    let uploader = shop
      .uploader
      .as_ref()
      .ok_or_else(|| eyre!("Image upload needs the remote source with endpoints.upload_image; use --image-url"))?;
    fields.image_url = Some(uploader.upload(&path).await?);
  }
  if args.unavailable {
    fields.is_available = false;
  }
  Ok(())
}

fn apply_news_args(fields: &mut NewsFields, args: NewsArgs) {
  if let Some(title) = args.title {
    fields.title = title;
  }
  if let Some(content) = args.content {
    fields.content = content;
  }
  if let Some(url) = args.image_url {
    fields.image_url = Some(url);
  }
  if args.draft {
    fields.is_published = false;
  }
}

fn apply_video_args(fields: &mut VideoFields, args: VideoArgs) {
  if let Some(title) = args.title {
    fields.title = title;
  }
  if let Some(description) = args.description {
    fields.description = Some(description);
  }
  if let Some(url) = args.url {
    fields.video_url = url;
  }
  if let Some(url) = args.thumbnail_url {
    fields.thumbnail_url = Some(url);
  }
  if args.draft {
    fields.is_published = false;
  }
}

fn product_line(product: &Product) -> String {
  format!(
    "{:>4}  {:<12} {:>12}  {}{}",
    product.id,
    product.category,
    product.price_label(),
    product.name,
    hidden_marker(product)
  )
}

fn hidden_marker<R: Record>(record: &R) -> &'static str {
  if record.is_available() {
    ""
  } else {
    "  [hidden]"
  }
}

fn date_label(date: Option<chrono::NaiveDateTime>) -> String {
  date
    .map(|d| d.format("%Y-%m-%d").to_string())
    .unwrap_or_else(|| "----------".to_string())
}

fn confirm(prompt: &str) -> Result<bool> {
  let answer = prompt_line(&format!("{} [y/N] ", prompt))?;
  Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
  matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "д" | "да")
}

fn prompt_line(prompt: &str) -> Result<String> {
  print!("{}", prompt);
  io::stdout().flush()?;

  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .map_err(|e| eyre!("Failed to read input: {}", e))?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
