//! HTTP route handlers for the viewer.

pub mod details;
pub mod file;
pub mod statics;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
