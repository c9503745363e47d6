//! Source context for a call site.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use rpcstats_monitor::{source, EnvMetadata, SourceSnippet};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::ServerState;

/// Query parameters for the file page.
#[derive(Debug, Deserialize, Default)]
pub struct FileQuery {
    /// Path of the source file.
    #[serde(default)]
    pub f: String,
    /// Line to highlight; malformed values become 0.
    #[serde(default)]
    pub n: String,
}

/// Response for the file page.
#[derive(Serialize)]
pub struct FileResponse {
    pub env: EnvMetadata,
    #[serde(flatten)]
    pub snippet: SourceSnippet,
}

/// GET /rpcstats/file?f=&n= - A source file with one line highlighted.
pub async fn get(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<FileQuery>,
) -> Result<Json<FileResponse>, AppError> {
    let line = source::parse_line_number(&params.n);

    let snippet = source::load(&params.f, line).map_err(|e| {
        tracing::error!("Failed to load source context: {}", e);
        AppError::Internal("failed to read source file".into())
    })?;

    Ok(Json(FileResponse {
        env: state.env.clone(),
        snippet,
    }))
}
