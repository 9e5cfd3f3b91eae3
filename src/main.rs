use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use promodash::api::ResourceClient;
use promodash::app::App;
use promodash::cache::FetchCache;
use promodash::config::Config;
use promodash::logging;
use promodash::resources::{Resources, Session};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "promodash")]
#[command(about = "A terminal dashboard for store promotions and price lists")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./promodash.yaml, then $XDG_CONFIG_HOME/promodash/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Store context token, overriding api.context
  #[arg(long)]
  context: Option<String>,

  /// Write the price list CSV export to this path and exit
  #[arg(short, long, value_name = "FILE")]
  export: Option<PathBuf>,

  /// Directory for log files (default: $XDG_DATA_HOME/promodash/logs)
  #[arg(long)]
  log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _guard = logging::init(args.log_dir)?;

  let config = Config::load(args.config.as_deref())?;
  let resources = build_resources(&config, args.context)?;

  if let Some(path) = args.export {
    let export = resources
      .export_price_lists()
      .await
      .map_err(|e| eyre!("Export failed: {}", e))?;
    std::fs::write(&path, export.body.as_bytes())
      .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;
    println!("Wrote {} rows to {}", export.rows, path.display());
    return Ok(());
  }

  info!(api = %config.api.url, "starting");
  let mut app = App::new(config, resources);
  app.run().await
}

fn build_resources(config: &Config, context: Option<String>) -> Result<Resources> {
  let mut client = ResourceClient::new(&config.api.url)
    .map_err(|e| eyre!("Invalid api.url {:?}: {}", config.api.url, e))?;
  if let Some(secs) = config.api.timeout_secs {
    client = client.with_timeout(Duration::from_secs(secs))?;
  }
  if let Some(token) = Config::api_token() {
    client = client.with_token(token);
  }

  let cache = FetchCache::new().with_dedupe_interval(config.cache.dedupe_interval());
  let session = Session::new(context.or_else(|| config.api.context.clone()));
  if !session.is_ready() {
    info!("no store context configured; lists stay empty until one is set");
  }

  Ok(Resources::new(client, cache, session))
}
