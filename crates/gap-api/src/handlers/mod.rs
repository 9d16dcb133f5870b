use std::sync::Arc;

use gap_common::ReferenceEntity;
use gap_common::corpus::Corpus;

use crate::SharedState;
use crate::error::ApiError;

pub mod gap;
pub mod health;
pub mod score;
pub mod stats;

/// An inline corpus replaces the loaded snapshot for one request. Keyword
/// extraction for it runs on the blocking pool.
pub(crate) async fn resolve_corpus(
    state: &SharedState,
    inline: Option<Vec<ReferenceEntity>>,
) -> Result<Arc<Corpus>, ApiError> {
    let Some(entities) = inline else {
        return Ok(state.corpus.clone());
    };

    let corpus = tokio::task::spawn_blocking(move || Corpus::from_entities(entities))
        .await
        .map_err(|err| ApiError::Internal(format!("corpus preparation failed: {err}")))?;
    Ok(Arc::new(corpus))
}
