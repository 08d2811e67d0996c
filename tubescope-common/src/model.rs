//! Wire model for enriched search results
//!
//! These types are what a live client sees: one [`EnrichedResult`] is
//! serialized into a single text frame per pipeline run.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, process-unique handle naming one live transport connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Allocate a fresh identity for a newly opened connection
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One catalog entry as returned by the search API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub channel_id: String,
    pub channel_title: String,
}

/// Full view of one catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    #[serde(flatten)]
    pub video: Video,
    /// Uploader-assigned tags, empty when the entry has none
    pub tags: Vec<String>,
}

/// Channel metadata
///
/// Counts are `None` when the channel hides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub subscriber_count: Option<u64>,
    pub video_count: Option<u64>,
}

/// Channel metadata plus its most recent uploads, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    #[serde(flatten)]
    pub channel: Channel,
    pub videos: Vec<Video>,
}

/// Videos found for one tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedVideos {
    pub tag: String,
    pub items: Vec<Video>,
}

/// Occurrences of one word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Word frequencies over the descriptions returned for a keyword,
/// most frequent first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordStats {
    pub query: String,
    pub words: Vec<WordCount>,
}

/// Catalog entry plus its computed readability scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedItem {
    #[serde(flatten)]
    pub video: Video,
    /// Flesch-Kincaid grade level (null when readability scoring was unavailable)
    pub readability_grade: Option<f64>,
    /// Flesch reading ease (null when readability scoring was unavailable)
    pub readability_score: Option<f64>,
}

impl EnrichedItem {
    /// Item without scores
    pub fn unscored(video: Video) -> Self {
        Self {
            video,
            readability_grade: None,
            readability_score: None,
        }
    }
}

/// Three-valued sentiment tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// What caused a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// A query submitted by the client
    Request,
    /// A periodic replay of a remembered query
    Refresh,
}

impl Origin {
    /// Value of the `fromKeyword` wire flag
    pub fn is_from_keyword(self) -> bool {
        matches!(self, Origin::Request)
    }
}

/// Output of one enrichment pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedResult {
    pub query: String,
    pub average_readability_grade: Option<f64>,
    pub average_readability_score: Option<f64>,
    pub sentiment: Sentiment,
    #[serde(rename = "fromKeyword", with = "origin_flag")]
    pub origin: Origin,
    pub items: Vec<EnrichedItem>,
}

impl EnrichedResult {
    /// Serialize to the single text payload pushed to clients
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// `Origin` travels as the boolean `fromKeyword`
mod origin_flag {
    use super::Origin;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(origin: &Origin, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(origin.is_from_keyword())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Origin, D::Error> {
        let from_keyword = bool::deserialize(deserializer)?;
        Ok(if from_keyword {
            Origin::Request
        } else {
            Origin::Refresh
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample_video() -> Video {
        Video {
            id: "abc123".to_string(),
            title: "Rust in ten minutes".to_string(),
            description: "A quick tour.".to_string(),
            thumbnail_url: "https://i.ytimg.com/vi/abc123/hqdefault.jpg".to_string(),
            channel_id: "UC123".to_string(),
            channel_title: "Crab Corner".to_string(),
        }
    }

    #[test]
    fn test_result_serializes_to_client_schema() {
        let result = EnrichedResult {
            query: "rust".to_string(),
            average_readability_grade: Some(7.5),
            average_readability_score: None,
            sentiment: Sentiment::Positive,
            origin: Origin::Refresh,
            items: vec![EnrichedItem {
                video: sample_video(),
                readability_grade: Some(7.5),
                readability_score: None,
            }],
        };

        let json: Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();

        assert_eq!(json["query"], "rust");
        assert_eq!(json["averageReadabilityGrade"], 7.5);
        assert!(json["averageReadabilityScore"].is_null());
        assert_eq!(json["sentiment"], "positive");
        assert_eq!(json["fromKeyword"], false);

        let item = &json["items"][0];
        assert_eq!(item["id"], "abc123");
        assert_eq!(item["thumbnailUrl"], "https://i.ytimg.com/vi/abc123/hqdefault.jpg");
        assert_eq!(item["channelId"], "UC123");
        assert_eq!(item["channelTitle"], "Crab Corner");
        assert_eq!(item["readabilityGrade"], 7.5);
        assert!(item["readabilityScore"].is_null());
    }

    #[test]
    fn test_request_origin_sets_from_keyword() {
        let result = EnrichedResult {
            query: "q".to_string(),
            average_readability_grade: None,
            average_readability_score: None,
            sentiment: Sentiment::Neutral,
            origin: Origin::Request,
            items: Vec::new(),
        };

        let json: Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["fromKeyword"], true);
        assert_eq!(json["sentiment"], "neutral");
    }

    #[test]
    fn test_profile_flattens_channel_fields() {
        let profile = ChannelProfile {
            channel: Channel {
                id: "UC123".to_string(),
                name: "Crab Corner".to_string(),
                description: "Weekly crustacean content.".to_string(),
                image_url: "https://yt3.example/crab.jpg".to_string(),
                subscriber_count: Some(1200),
                video_count: None,
            },
            videos: vec![sample_video()],
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["name"], "Crab Corner");
        assert_eq!(json["imageUrl"], "https://yt3.example/crab.jpg");
        assert_eq!(json["subscriberCount"], 1200);
        assert!(json["videoCount"].is_null());
        assert_eq!(json["videos"][0]["id"], "abc123");
    }

    #[test]
    fn test_connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }
}
