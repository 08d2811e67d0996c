//! One-shot search endpoint
//!
//! Runs the same enrichment pipeline a live connection uses, without a
//! session: nothing is remembered and nothing is refreshed.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::warn;
use tubescope_common::{EnrichedResult, Origin};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for `/api/search`
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/search?q=keyword
///
/// Blank keyword is a 400; a failed catalog search is a 502 carrying the
/// same error string a live client would receive.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<EnrichedResult>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query parameter 'q' must not be blank".to_string()));
    }

    match state.pipeline.run(query, Origin::Request).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            warn!(error = %e, "One-shot search failed");
            Err(ApiError::Upstream(e.error_message()))
        }
    }
}
