use axum::{Json, extract::State, extract::rejection::JsonRejection};

use gap_common::api::{GapAnalysisResponse, GapDetectRequest};

use crate::SharedState;
use crate::auth::Authorized;
use crate::error::ApiError;
use crate::handlers::resolve_corpus;

pub async fn detect_gap(
    State(state): State<SharedState>,
    _auth: Authorized,
    payload: Result<Json<GapDetectRequest>, JsonRejection>,
) -> Result<Json<GapAnalysisResponse>, ApiError> {
    gap_metrics::record_request("gap_detect");
    let Json(request) = payload?;
    request.validate()?;

    let corpus = resolve_corpus(&state, request.reference_corpus).await?;

    let analysis = state.engine.detect_gap(
        &request.candidate_description,
        request.candidate_category.as_deref(),
        &corpus,
    )?;
    gap_metrics::record_gap_verdict(analysis.is_gap);

    Ok(Json(GapAnalysisResponse::from(&analysis)))
}
