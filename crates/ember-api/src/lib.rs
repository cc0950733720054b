//! JSON HTTP API for Ember.
//!
//! Exposes an axum [`Router`] backed by any [`EmergencyStore`]. Callers log
//! in with a username, receive a bearer token, and present it on every
//! personal route.
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | `POST` | `/login` | none |
//! | `GET` `POST` | `/contacts` | bearer |
//! | `DELETE` | `/contacts/{surrogate_id}` | bearer |
//! | `GET` `POST` | `/notifications` | bearer |
//! | `GET` `POST` | `/evacuation-assistance` | bearer |
//! | `GET` | `/relations`, `/nations`, `/states` | none |

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use chrono::Duration;
use ember_core::{identity::Identity, store::EmergencyStore};
use ember_token::{TokenConfig, TokenService};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
use handlers::{contacts, evacuation, login, notifications, reference};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `EMBER_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Shared HMAC secret for bearer tokens.
  pub token_secret:    String,
  #[serde(default = "default_token_ttl_secs")]
  pub token_ttl_secs:  i64,
  /// Directory identities written to the store at startup.
  #[serde(default)]
  pub seed_identities: Vec<Identity>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8000 }

fn default_token_ttl_secs() -> i64 { 15 * 60 }

impl ServerConfig {
  pub fn token_config(&self) -> TokenConfig {
    TokenConfig::new(self.token_secret.as_bytes())
      .with_ttl(Duration::seconds(self.token_ttl_secs))
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: EmergencyStore> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenService>,
}

impl<S: EmergencyStore> AppState<S> {
  pub fn new(store: S, tokens: TokenService) -> Self {
    Self { store: Arc::new(store), tokens: Arc::new(tokens) }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the Ember API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: EmergencyStore + Clone + 'static,
{
  Router::new()
    .route("/login",                  post(login::handler::<S>))
    .route("/contacts",               get(contacts::list::<S>).post(contacts::upsert::<S>))
    .route("/contacts/{surrogate_id}", delete(contacts::remove::<S>))
    .route("/notifications",          get(notifications::get::<S>).post(notifications::set::<S>))
    .route("/evacuation-assistance",  get(evacuation::get::<S>).post(evacuation::set::<S>))
    .route("/relations",              get(reference::relations::<S>))
    .route("/nations",                get(reference::nations::<S>))
    .route("/states",                 get(reference::states::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
