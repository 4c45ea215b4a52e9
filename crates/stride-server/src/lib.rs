//! HTTP server assembly for Stride.
//!
//! Mounts the JSON API under `/api`, adds a liveness probe, and wraps
//! everything in a request-tracing layer. The binary in `main.rs` supplies the
//! store and configuration.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::{Deserialize, Serialize};
use stride_api::Broadcaster;
use stride_core::store::SocialStore;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `STRIDE_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  /// SQLite database file. A leading `~/` is expanded.
  pub store_path:      PathBuf,
  /// Signals buffered per live subscriber before it has to resync.
  pub signal_capacity: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_string(),
      port:            8080,
      store_path:      PathBuf::from("stride.db"),
      signal_capacity: 256,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router over `store`.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: SocialStore + 'static,
{
  let signals = Broadcaster::new(config.signal_capacity);
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", stride_api::api_router(store, signals))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
