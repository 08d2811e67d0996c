//! # Tubescope Common Library
//!
//! Shared code for the Tubescope services including:
//! - Wire model for enriched search results (JSON schema pushed to clients)
//!   and the channel, video, tag and word-statistics views
//! - Bounded most-recently-used search history
//! - Configuration file resolution and loading
//! - Common error type

pub mod config;
pub mod error;
pub mod history;
pub mod model;

pub use error::{Error, Result};
pub use history::SearchHistory;
pub use model::{
    Channel, ChannelProfile, ConnectionId, EnrichedItem, EnrichedResult, Origin, Sentiment,
    TaggedVideos, Video, VideoDetails, WordCount, WordStats,
};
