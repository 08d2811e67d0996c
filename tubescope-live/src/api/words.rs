//! Word statistics endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use tubescope_common::WordStats;

use super::search::SearchQuery;
use crate::error::{ApiError, ApiResult};
use crate::scoring::word_frequencies;
use crate::AppState;

/// GET /api/words?q=keyword
///
/// Counts words across the descriptions of the keyword's search results.
/// A keyword whose results carry no words is a 404.
pub async fn word_stats(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<WordStats>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query parameter 'q' must not be blank".to_string()));
    }

    let videos = state.catalog.search(query).await?;
    let descriptions: Vec<&str> = videos.iter().map(|v| v.description.as_str()).collect();
    let words = word_frequencies(&descriptions);

    if words.is_empty() {
        return Err(ApiError::NotFound(format!("No word stats found for: {}", query)));
    }

    Ok(Json(WordStats {
        query: query.to_string(),
        words,
    }))
}
