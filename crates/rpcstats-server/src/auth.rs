//! Administrator access gate.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::ServerState;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no bearer credentials")]
    MissingCredentials,
    #[error("no admin token configured")]
    NotConfigured,
    #[error("invalid admin token")]
    InvalidToken,
}

/// Middleware admitting only administrators.
pub async fn require_admin(
    State(state): State<Arc<ServerState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(e) = authorize(&state.config, req.headers()) {
        tracing::warn!(uri = %req.uri(), "Rejected request: {}", e);
        return Err(e.into());
    }
    Ok(next.run(req).await)
}

/// Checks the request headers against the configured admin token.
pub fn authorize(config: &ServerConfig, headers: &HeaderMap) -> Result<(), AuthError> {
    if config.dev_mode {
        return Ok(());
    }

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    let expected = config
        .admin_token
        .as_deref()
        .ok_or(AuthError::NotConfigured)?;

    if !tokens_match(token.as_bytes(), expected.as_bytes()) {
        return Err(AuthError::InvalidToken);
    }
    Ok(())
}

/// Compares tokens without exiting early on the first differing byte.
fn tokens_match(given: &[u8], expected: &[u8]) -> bool {
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
