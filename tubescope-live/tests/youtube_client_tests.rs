//! YouTube client against an in-process fake of the Data API

use axum::{
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use tubescope_live::catalog::{CatalogError, VideoCatalog, YouTubeCatalog};
use tubescope_live::config::CatalogSettings;

async fn fake_search(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if params.get("key").map(String::as_str) != Some("test-key") {
        return (StatusCode::FORBIDDEN, "missing key").into_response();
    }
    if params.get("q").map(String::as_str) == Some("quota") {
        return (StatusCode::FORBIDDEN, "quotaExceeded").into_response();
    }

    // Echo the request shape so the test can check it
    let echo = format!(
        "type={} maxResults={} order={} part={}",
        params.get("type").cloned().unwrap_or_default(),
        params.get("maxResults").cloned().unwrap_or_default(),
        params.get("order").cloned().unwrap_or_default(),
        params.get("part").cloned().unwrap_or_default(),
    );

    Json(json!({
        "items": [
            {
                "id": {"kind": "youtube#video", "videoId": "vid-1"},
                "snippet": {
                    "title": params.get("q").or(params.get("channelId")).cloned().unwrap_or_default(),
                    "description": echo,
                    "channelId": "UC1",
                    "channelTitle": "Channel",
                    "thumbnails": {"medium": {"url": "https://img/vid-1/mq.jpg"}}
                }
            },
            {
                "id": {"kind": "youtube#playlist", "playlistId": "PL1"},
                "snippet": {"title": "A playlist"}
            }
        ]
    }))
    .into_response()
}

async fn fake_videos(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    match params.get("id").map(String::as_str) {
        Some("vid-1") => Json(json!({
            "items": [{"snippet": {"description": "The complete, untruncated description."}}]
        }))
        .into_response(),
        Some("tagged") => Json(json!({
            "items": [{
                "id": "tagged",
                "snippet": {
                    "title": "Tagged video",
                    "description": "Has tags.",
                    "channelId": "UC1",
                    "channelTitle": "Channel",
                    "thumbnails": {"high": {"url": "https://img/tagged/hq.jpg"}},
                    "tags": ["rust", "async"]
                }
            }]
        }))
        .into_response(),
        Some("garbled") => (StatusCode::OK, "not json").into_response(),
        _ => Json(json!({"items": []})).into_response(),
    }
}

async fn fake_channels(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if params.get("part").map(String::as_str) != Some("snippet,statistics") {
        return (StatusCode::BAD_REQUEST, "bad part").into_response();
    }
    match params.get("id").map(String::as_str) {
        Some("UC1") => Json(json!({
            "items": [{
                "id": "UC1",
                "snippet": {
                    "title": "Channel",
                    "description": "All about things.",
                    "thumbnails": {"default": {"url": "https://img/UC1/avatar.jpg"}}
                },
                "statistics": {"subscriberCount": "1500", "videoCount": "75"}
            }]
        }))
        .into_response(),
        _ => Json(json!({"items": []})).into_response(),
    }
}

/// Start the fake API and return a client pointed at it
async fn client() -> YouTubeCatalog {
    let app = Router::new()
        .route("/search", get(fake_search))
        .route("/videos", get(fake_videos))
        .route("/channels", get(fake_channels));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let settings = CatalogSettings {
        base_url: format!("http://{}/", addr),
        api_key: Some("test-key".to_string()),
        max_results: 7,
        request_timeout_ms: 2_000,
    };
    YouTubeCatalog::new(&settings).unwrap()
}

#[tokio::test]
async fn test_search_maps_videos_and_sends_parameters() {
    let catalog = client().await;

    let videos = catalog.search("rust async").await.unwrap();

    assert_eq!(videos.len(), 1, "non-video entries are skipped");
    let v = &videos[0];
    assert_eq!(v.id, "vid-1");
    assert_eq!(v.title, "rust async");
    assert_eq!(v.description, "type=video maxResults=7 order=date part=snippet");
    assert_eq!(v.thumbnail_url, "https://img/vid-1/mq.jpg");
    assert_eq!(v.channel_id, "UC1");
}

#[tokio::test]
async fn test_search_error_status() {
    let catalog = client().await;

    match catalog.search("quota").await {
        Err(CatalogError::Api { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "quotaExceeded");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_description() {
    let catalog = client().await;

    let description = catalog.fetch_description("vid-1").await.unwrap();
    assert_eq!(description, "The complete, untruncated description.");

    assert!(matches!(
        catalog.fetch_description("gone").await,
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        catalog.fetch_description("garbled").await,
        Err(CatalogError::Parse(_))
    ));
}

#[tokio::test]
async fn test_fetch_video_with_tags() {
    let catalog = client().await;

    let details = catalog.fetch_video("tagged").await.unwrap();
    assert_eq!(details.video.id, "tagged");
    assert_eq!(details.video.title, "Tagged video");
    assert_eq!(details.video.thumbnail_url, "https://img/tagged/hq.jpg");
    assert_eq!(details.tags, vec!["rust", "async"]);

    let untagged = catalog.fetch_video("vid-1").await.unwrap();
    assert_eq!(untagged.video.id, "vid-1");
    assert!(untagged.tags.is_empty());
}

#[tokio::test]
async fn test_fetch_channel() {
    let catalog = client().await;

    let channel = catalog.fetch_channel("UC1").await.unwrap();
    assert_eq!(channel.name, "Channel");
    assert_eq!(channel.image_url, "https://img/UC1/avatar.jpg");
    assert_eq!(channel.subscriber_count, Some(1500));
    assert_eq!(channel.video_count, Some(75));

    assert!(matches!(
        catalog.fetch_channel("UC-missing").await,
        Err(CatalogError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_channel_uploads_sends_channel_and_count() {
    let catalog = client().await;

    let videos = catalog.channel_uploads("UC1", 10).await.unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].title, "UC1");
    assert_eq!(
        videos[0].description,
        "type=video maxResults=10 order=date part=snippet"
    );
}

#[tokio::test]
async fn test_search_tagged_uses_keyword_search() {
    let catalog = client().await;

    let videos = catalog.search_tagged("rustlang").await.unwrap();
    assert_eq!(videos[0].title, "rustlang");
    assert_eq!(
        videos[0].description,
        "type=video maxResults=7 order=date part=snippet"
    );
}

#[tokio::test]
async fn test_unreachable_catalog_is_network_error() {
    let settings = CatalogSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: None,
        max_results: 5,
        request_timeout_ms: 500,
    };
    let catalog = YouTubeCatalog::new(&settings).unwrap();

    assert!(matches!(
        catalog.search("anything").await,
        Err(CatalogError::Network(_))
    ));
}
