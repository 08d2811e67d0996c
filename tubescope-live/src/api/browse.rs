//! Catalog browse endpoints
//!
//! Single lookups straight against the catalog. Nothing here touches the
//! mesh or the scoring services.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;
use tubescope_common::{ChannelProfile, TaggedVideos, VideoDetails};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Uploads shown on a channel profile
pub const CHANNEL_UPLOADS: u32 = 10;

/// GET /api/video/:id
pub async fn video_details(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoDetails>> {
    let details = state.catalog.fetch_video(&video_id).await?;
    Ok(Json(details))
}

/// GET /api/channel/:id
///
/// Metadata and the latest uploads are fetched concurrently; either failing
/// fails the request.
pub async fn channel_profile(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<Json<ChannelProfile>> {
    let (channel, videos) = tokio::try_join!(
        state.catalog.fetch_channel(&channel_id),
        state.catalog.channel_uploads(&channel_id, CHANNEL_UPLOADS),
    )?;
    debug!(channel = %channel_id, uploads = videos.len(), "Channel profile assembled");

    Ok(Json(ChannelProfile { channel, videos }))
}

/// Query parameters for `/api/tags`
#[derive(Debug, Deserialize)]
pub struct TagQuery {
    #[serde(default)]
    pub tag: String,
}

/// GET /api/tags?tag=name
pub async fn search_tags(
    State(state): State<AppState>,
    Query(params): Query<TagQuery>,
) -> ApiResult<Json<TaggedVideos>> {
    let tag = params.tag.trim();
    if tag.is_empty() {
        return Err(ApiError::BadRequest("query parameter 'tag' must not be blank".to_string()));
    }

    let items = state.catalog.search_tagged(tag).await?;
    Ok(Json(TaggedVideos {
        tag: tag.to_string(),
        items,
    }))
}
