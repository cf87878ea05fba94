//! JSON REST API for Rumble.
//!
//! Exposes an axum [`Router`] backed by any
//! [`StatSource`](rumble_core::source::StatSource) +
//! [`MatchStore`](rumble_core::store::MatchStore) pair. All routes
//! require HTTP Basic auth (see [`auth`]).

pub mod auth;
pub mod error;
pub mod leaderboard;
pub mod matches;
pub mod roster;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use rumble_core::{MatchEngine, source::StatSource, store::MatchStore};
use serde::Deserialize;

use auth::AuthConfig;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  /// Base URL of the external stat API.
  pub source_base_url:    String,
  /// Per-fetch timeout against the stat API, in seconds.
  #[serde(default = "default_fetch_timeout_secs")]
  pub fetch_timeout_secs: u64,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

fn default_fetch_timeout_secs() -> u64 {
  30
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<F, S> {
  pub engine: Arc<MatchEngine<F, S>>,
  pub auth:   Arc<AuthConfig>,
}

impl<F, S> Clone for AppState<F, S> {
  fn clone(&self) -> Self {
    Self {
      engine: Arc::clone(&self.engine),
      auth:   Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn api_router<F, S>(state: AppState<F, S>) -> Router
where
  F: StatSource + 'static,
  S: MatchStore + 'static,
{
  Router::new()
    // Roster passthrough
    .route("/combatants", get(roster::list::<F, S>))
    .route("/combatants/{name}", get(roster::get_one::<F, S>))
    // Matches
    .route(
      "/matches",
      get(matches::history::<F, S>).post(matches::create::<F, S>),
    )
    .route("/matches/{id}/retract", post(matches::retract_one::<F, S>))
    // Leaderboard
    .route("/leaderboard", get(leaderboard::totals::<F, S>))
    .with_state(state)
}
