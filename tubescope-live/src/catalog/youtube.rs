//! YouTube Data API client
//!
//! # API Reference
//! - Search: `GET {base}/search?part=snippet&q=..&type=video&maxResults=N&order=date&key=..`
//! - Detail: `GET {base}/videos?part=snippet&id=..&key=..`
//! - Channel: `GET {base}/channels?part=snippet,statistics&id=..&key=..`
//! - Uploads: `GET {base}/search?part=snippet&channelId=..&type=video&maxResults=N&order=date&key=..`
//!
//! Search snippets carry a truncated description; the detail call returns the
//! full text used for scoring.

use super::{CatalogError, VideoCatalog};
use crate::config::CatalogSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use tubescope_common::{Channel, Video, VideoDetails};

/// User-Agent header sent with every catalog request
const USER_AGENT: &str = concat!("tubescope-live/", env!("CARGO_PKG_VERSION"));

/// YouTube catalog client
pub struct YouTubeCatalog {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    max_results: u32,
}

impl YouTubeCatalog {
    /// Create a client from catalog settings
    ///
    /// # Errors
    /// Returns [`CatalogError::Network`] if the HTTP client cannot be built
    /// (e.g. TLS backend initialisation failure).
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let http_client = Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            max_results: settings.max_results,
        })
    }

    async fn get_json<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T, CatalogError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self.http_client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Network(format!("Catalog request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(format!("Failed to parse catalog response: {}", e)))
    }
}

#[async_trait]
impl VideoCatalog for YouTubeCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Video>, CatalogError> {
        debug!(query = %query, "Searching catalog");
        let videos = self
            .search_videos(vec![("q", query.to_string())], self.max_results)
            .await?;
        debug!(query = %query, count = videos.len(), "Catalog search complete");
        Ok(videos)
    }

    async fn fetch_description(&self, video_id: &str) -> Result<String, CatalogError> {
        self.fetch_video(video_id)
            .await
            .map(|details| details.video.description)
    }

    async fn fetch_video(&self, video_id: &str) -> Result<VideoDetails, CatalogError> {
        let params = [("part", "snippet".to_string()), ("id", video_id.to_string())];
        let response: VideosResponse = self.get_json("videos", &params).await?;

        response
            .items
            .into_iter()
            .next()
            .map(|item| item.into_details(video_id))
            .ok_or_else(|| CatalogError::NotFound(format!("Video not found: {}", video_id)))
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<Channel, CatalogError> {
        let params = [
            ("part", "snippet,statistics".to_string()),
            ("id", channel_id.to_string()),
        ];
        let response: ChannelsResponse = self.get_json("channels", &params).await?;

        response
            .items
            .into_iter()
            .next()
            .map(|item| item.into_channel(channel_id))
            .ok_or_else(|| CatalogError::NotFound(format!("Channel not found: {}", channel_id)))
    }

    async fn channel_uploads(
        &self,
        channel_id: &str,
        count: u32,
    ) -> Result<Vec<Video>, CatalogError> {
        self.search_videos(vec![("channelId", channel_id.to_string())], count)
            .await
    }

    async fn search_tagged(&self, tag: &str) -> Result<Vec<Video>, CatalogError> {
        debug!(tag = %tag, "Searching catalog by tag");
        self.search_videos(vec![("q", tag.to_string())], self.max_results)
            .await
    }
}

impl YouTubeCatalog {
    /// Newest-first video search; `params` narrows it by keyword or channel
    async fn search_videos(
        &self,
        mut params: Vec<(&'static str, String)>,
        max_results: u32,
    ) -> Result<Vec<Video>, CatalogError> {
        params.extend([
            ("part", "snippet".to_string()),
            ("type", "video".to_string()),
            ("maxResults", max_results.to_string()),
            ("order", "date".to_string()),
        ]);
        let response: SearchResponse = self.get_json("search", &params).await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(SearchItem::into_video)
            .collect())
    }
}

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

impl SearchItem {
    /// Entries without a video id (channels, playlists) are skipped
    fn into_video(self) -> Option<Video> {
        let id = self.id.video_id?;
        Some(self.snippet.into_video(id))
    }
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_id: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
    #[serde(default)]
    tags: Vec<String>,
}

impl Snippet {
    fn into_video(self, id: String) -> Video {
        Video {
            id,
            title: self.title,
            description: self.description,
            thumbnail_url: self.thumbnails.best_url().unwrap_or_default(),
            channel_id: self.channel_id,
            channel_title: self.channel_title,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

impl Thumbnails {
    fn best_url(self) -> Option<String> {
        self.high
            .or(self.medium)
            .or(self.default)
            .map(|t| t.url)
    }

    /// Avatar-sized image for channel headers
    fn smallest_url(self) -> Option<String> {
        self.default
            .or(self.medium)
            .or(self.high)
            .map(|t| t.url)
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: Option<String>,
    snippet: Snippet,
}

impl VideoItem {
    fn into_details(self, requested_id: &str) -> VideoDetails {
        let id = self.id.unwrap_or_else(|| requested_id.to_string());
        let mut snippet = self.snippet;
        let tags = std::mem::take(&mut snippet.tags);
        VideoDetails {
            video: snippet.into_video(id),
            tags,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChannelsResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: Option<String>,
    snippet: ChannelSnippet,
    #[serde(default)]
    statistics: ChannelStatistics,
}

impl ChannelItem {
    fn into_channel(self, requested_id: &str) -> Channel {
        Channel {
            id: self.id.unwrap_or_else(|| requested_id.to_string()),
            name: self.snippet.title,
            description: self.snippet.description,
            image_url: self.snippet.thumbnails.smallest_url().unwrap_or_default(),
            subscriber_count: parse_count(self.statistics.subscriber_count),
            video_count: parse_count(self.statistics.video_count),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

/// The API sends counts as decimal strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<String>,
    video_count: Option<String>,
}

fn parse_count(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.parse().ok())
}
