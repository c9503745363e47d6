//! HTTP viewer for rpcstats trace records.
//!
//! All state is assembled once at startup into a [`ServerState`] and shared
//! read-only between requests.

pub mod assets;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use rpcstats_monitor::{EnvMetadata, KvCache, TraceAccessor};

use crate::assets::AssetRegistry;
use crate::config::ServerConfig;

pub struct ServerState {
    pub config: ServerConfig,
    pub env: EnvMetadata,
    pub accessor: TraceAccessor,
    pub assets: AssetRegistry,
}

impl ServerState {
    /// Creates state serving the embedded asset set.
    pub fn new(config: ServerConfig, cache: Arc<dyn KvCache>) -> Self {
        Self::with_assets(config, cache, AssetRegistry::embedded())
    }

    pub fn with_assets(config: ServerConfig, cache: Arc<dyn KvCache>, assets: AssetRegistry) -> Self {
        Self {
            env: EnvMetadata::new(config.application_id.clone()),
            accessor: TraceAccessor::new(cache),
            assets,
            config,
        }
    }
}

/// Builds the viewer routes. Everything except `/health` is admin-only.
pub fn router(state: Arc<ServerState>) -> Router {
    let admin_routes = Router::new()
        .route("/rpcstats/details", get(handlers::details::get))
        .route("/rpcstats/file", get(handlers::file::get))
        .route("/rpcstats/static/{name}", get(handlers::statics::get))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .merge(admin_routes)
        .route("/health", get(handlers::health))
        .with_state(state)
}
