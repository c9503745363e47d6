use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Request, Response};
use rpcstats_monitor::{KvCache, MemoryCache, SqliteCache};
use rpcstats_server::config::ServerConfig;
use rpcstats_server::{router, ServerState};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const PURGE_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env();
    if config.dev_mode {
        warn!("Dev mode enabled: access gate is disabled");
    } else if config.admin_token.is_none() {
        warn!("RPCSTATS_ADMIN_TOKEN not configured: all viewer requests will be rejected");
    }

    let cache = open_cache(&config)?;
    let addr = config.bind_addr.clone();
    let state = Arc::new(ServerState::new(config, cache));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let app = router(state).layer(trace_layer);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn open_cache(config: &ServerConfig) -> Result<Arc<dyn KvCache>> {
    let cache: Arc<dyn KvCache> = match &config.cache_path {
        Some(path) => {
            let cache = SqliteCache::new(path)
                .with_context(|| format!("failed to open cache at {}", path.display()))?;
            info!("Using SQLite cache at {}", path.display());
            Arc::new(cache)
        }
        None => {
            warn!("RPCSTATS_CACHE_PATH not set, using in-process cache");
            Arc::new(MemoryCache::new())
        }
    };

    spawn_purge_task(cache.clone());
    Ok(cache)
}

fn spawn_purge_task(cache: Arc<dyn KvCache>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = cache.purge_expired() {
                warn!("Failed to purge expired cache entries: {}", e);
            }
        }
    });
}
