//! Video catalog gateway
//!
//! Everything that talks to the external catalog goes through [`VideoCatalog`].
//! The pipeline makes one search call per query and one detail call per
//! returned item; the browse endpoints (video, channel, tag) make single
//! lookups.

pub mod youtube;

pub use youtube::YouTubeCatalog;

use async_trait::async_trait;
use thiserror::Error;
use tubescope_common::{Channel, Video, VideoDetails};

/// Catalog call failure
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// Catalog answered with a non-success status
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested entry does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Search and detail access to the external video catalog
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Search the catalog for a keyword
    async fn search(&self, query: &str) -> Result<Vec<Video>, CatalogError>;

    /// Fetch the full (untruncated) description of one entry
    async fn fetch_description(&self, video_id: &str) -> Result<String, CatalogError>;

    /// Fetch one entry with its full description and tags
    async fn fetch_video(&self, video_id: &str) -> Result<VideoDetails, CatalogError>;

    /// Fetch channel metadata
    async fn fetch_channel(&self, channel_id: &str) -> Result<Channel, CatalogError>;

    /// Most recent uploads of a channel, newest first, at most `count`
    async fn channel_uploads(&self, channel_id: &str, count: u32)
        -> Result<Vec<Video>, CatalogError>;

    /// Search for videos carrying a tag, newest first
    async fn search_tagged(&self, tag: &str) -> Result<Vec<Video>, CatalogError>;
}
