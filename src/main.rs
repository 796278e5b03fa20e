mod admin;
mod app;
mod cache;
mod catalog;
mod cli;
mod commands;
mod config;
mod content;
mod error;
mod event;
mod logging;
mod query;
mod record;
mod shop;
mod source;
mod store;
mod ui;

use clap::Parser;
use color_eyre::Result;

use crate::cli::{Args, Command};
use crate::logging::LogTarget;

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Override source if specified on command line
  if let Some(source) = args.source {
    config.source = source;
  }

  let command = args.command.unwrap_or(Command::Tui);
  let target = match command {
    Command::Tui => LogTarget::File,
    _ => LogTarget::Stderr,
  };
  let _log_guard = logging::init(&config.log.level, target)?;

  let shop = shop::Shop::build(&config)?;

  match command {
    Command::Tui => {
      let mut app = app::App::new(shop);
      app.run().await
    }
    command => cli::run(command, &shop).await,
  }
}
