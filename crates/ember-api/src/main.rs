//! ember-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered with
//! `EMBER_*` environment variables, opens an in-process SQLite store, and
//! serves the Ember API over HTTP.
//!
//! # Secret generation
//!
//! To generate a value for `token_secret`:
//!
//! ```text
//! cargo run -p ember-api --bin ember-server -- --generate-secret
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use ember_api::{AppState, ServerConfig};
use ember_core::store::EmergencyStore as _;
use ember_store_sqlite::SqliteStore;
use ember_token::TokenService;
use rand_core::{OsRng, RngCore as _};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Ember emergency-contact server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print a random 32-byte hex secret suitable for `token_secret` and exit.
  #[arg(long)]
  generate_secret: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: print a secret and exit.
  if cli.generate_secret {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    println!("{}", hex::encode(secret));
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("EMBER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  anyhow::ensure!(
    !server_cfg.token_secret.trim().is_empty(),
    "token_secret must not be empty"
  );

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  for identity in server_cfg.seed_identities.iter().cloned() {
    let username = identity.username.clone();
    store
      .add_identity(identity)
      .await
      .with_context(|| format!("failed to seed identity {username:?}"))?;
  }
  if !server_cfg.seed_identities.is_empty() {
    tracing::info!(count = server_cfg.seed_identities.len(), "seeded identities");
  }

  // Build application state.
  let tokens = TokenService::new(server_cfg.token_config());
  let app = ember_api::router(AppState::new(store, tokens));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
