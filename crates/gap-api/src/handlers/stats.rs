use axum::{Json, extract::State};
use serde_json::json;

use gap_common::api::ENGINE_VERSION;

use crate::SharedState;
use crate::auth::Authorized;
use crate::error::ApiError;

pub async fn stats(
    State(state): State<SharedState>,
    _auth: Authorized,
) -> Result<Json<serde_json::Value>, ApiError> {
    gap_metrics::record_request("stats");

    Ok(Json(json!({
        "engineVersion": ENGINE_VERSION,
        "corpus": {
            "entities": state.corpus.len(),
            "version": state.corpus.version(),
        },
        "config": state.engine.config(),
        "cache": {
            "entries": state.cache.len(),
            "capacity": state.cache.capacity(),
            "ttlSecs": state.cache.ttl().as_secs(),
        },
    })))
}
