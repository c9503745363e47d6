//! Static assets with long-lived cache headers.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, TimeDelta, Utc};

use crate::error::AppError;
use crate::ServerState;

/// Longest lifetime advertised for an asset (one year, per RFC 9111).
const MAX_STATIC_AGE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// GET /rpcstats/static/{name} - An embedded asset.
pub async fn get(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let asset = state
        .assets
        .get(&name)
        .ok_or_else(|| AppError::NotFound(format!("no static asset named {name}")))?;

    let max_age = state.config.static_max_age.min(MAX_STATIC_AGE);
    let expires = expires_at(Utc::now(), max_age);

    Ok((
        [
            (header::CONTENT_TYPE, asset.content_type.clone()),
            (header::CACHE_CONTROL, format!("public, max-age={}", max_age.as_secs())),
            (header::EXPIRES, http_date(expires)),
        ],
        asset.data.clone(),
    )
        .into_response())
}

fn expires_at(now: DateTime<Utc>, max_age: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(max_age)
        .ok()
        .and_then(|age| now.checked_add_signed(age))
        .unwrap_or(now)
}

/// Formats a timestamp as an RFC 1123 HTTP date.
fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
