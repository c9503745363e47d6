//! Request details page.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use rpcstats_monitor::{view, ViewModel};
use serde::Deserialize;

use crate::ServerState;

/// Query parameters for the details page.
#[derive(Debug, Deserialize, Default)]
pub struct DetailsQuery {
    #[serde(default)]
    pub rid: String,
}

/// GET /rpcstats/details?rid= - Call statistics for one request.
///
/// Never fails: an expired or unreadable record renders as an empty view.
pub async fn get(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<DetailsQuery>,
) -> Json<ViewModel> {
    let record = state.accessor.fetch(&params.rid);
    if record.is_none() {
        tracing::info!(rid = %params.rid, "No trace available for request");
    }

    Json(view::build(state.env.clone(), record))
}
