use axum::{Json, extract::State, extract::rejection::JsonRejection};

use gap_common::api::{BatchScoreRequest, BatchScoreResponse, ScoreRequest, ScoreResponse};

use crate::SharedState;
use crate::auth::Authorized;
use crate::cache::ScoreCache;
use crate::error::ApiError;
use crate::handlers::resolve_corpus;

const MAX_BATCH: usize = 200;

pub async fn score(
    State(state): State<SharedState>,
    _auth: Authorized,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<ScoreResponse>, ApiError> {
    gap_metrics::record_request("score");
    let Json(request) = payload?;
    request.candidate.validate()?;

    let corpus = resolve_corpus(&state, request.reference_corpus).await?;
    let key = ScoreCache::key(&request.candidate, corpus.version());

    if let Some(cached) = state.cache.get(&key) {
        gap_metrics::record_cache(true);
        return Ok(Json(cached));
    }
    gap_metrics::record_cache(false);

    let scored = state.engine.score(&request.candidate, &corpus)?;
    let response = ScoreResponse::from_scored(&scored, corpus.version());
    state.cache.insert(key, response.clone());

    Ok(Json(response))
}

pub async fn score_batch(
    State(state): State<SharedState>,
    _auth: Authorized,
    payload: Result<Json<BatchScoreRequest>, JsonRejection>,
) -> Result<Json<BatchScoreResponse>, ApiError> {
    gap_metrics::record_request("score_batch");
    let Json(request) = payload?;

    if request.candidates.len() > MAX_BATCH {
        return Err(ApiError::BadRequest(format!(
            "batch size {} exceeds limit of {MAX_BATCH}",
            request.candidates.len()
        )));
    }

    let corpus = resolve_corpus(&state, request.reference_corpus).await?;
    let candidates = request.candidates;
    let worker_state = state.clone();
    let worker_corpus = corpus.clone();

    // rayon fan-out off the async runtime
    let ranked = tokio::task::spawn_blocking(move || {
        worker_state.engine.rank(&candidates, &worker_corpus)
    })
    .await
    .map_err(|err| ApiError::Internal(format!("batch scoring task failed: {err}")))??;

    let limit = request.limit.unwrap_or(ranked.len());
    let results = ranked
        .iter()
        .take(limit)
        .map(|scored| ScoreResponse::from_scored(scored, corpus.version()))
        .collect();

    Ok(Json(BatchScoreResponse { results }))
}
