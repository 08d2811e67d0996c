//! Shared test fixtures: in-process fake catalog and mesh setup

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tubescope_common::{Channel, Video, VideoDetails};
use tubescope_live::catalog::{CatalogError, VideoCatalog};
use tubescope_live::config::{DetailFailurePolicy, MeshSettings};
use tubescope_live::mesh::{Supervisor, SupervisorEvent, SupervisorHandle};
use tubescope_live::pipeline::EnrichmentPipeline;
use tubescope_live::scoring::{spawn_default_services, ServiceDirectory};

/// Generous upper bound for anything a test waits on
pub const WAIT: Duration = Duration::from_secs(5);

pub fn video(id: &str) -> Video {
    Video {
        id: id.to_string(),
        title: format!("Video {}", id),
        description: format!("snippet for {}", id),
        thumbnail_url: format!("https://img.example/{}.jpg", id),
        channel_id: "chan-1".to_string(),
        channel_title: "Test Channel".to_string(),
    }
}

#[derive(Clone)]
enum SearchBehavior {
    Results(Vec<Video>),
    Fail,
    Panic(String),
    PanicUnknown,
    Slow(Duration, Vec<Video>),
}

/// Scriptable catalog; unknown queries return one video named after the query
#[derive(Default)]
pub struct FakeCatalog {
    searches: HashMap<String, SearchBehavior>,
    details: HashMap<String, String>,
    failing_details: HashSet<String>,
    missing: HashSet<String>,
    tags: HashMap<String, Vec<String>>,
    channels: HashMap<String, Channel>,
    uploads: HashMap<String, Vec<Video>>,
    tagged: HashMap<String, Vec<Video>>,
    upload_limits: Mutex<Vec<u32>>,
    search_calls: Mutex<Vec<String>>,
    detail_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, videos: Vec<Video>) -> Self {
        self.searches
            .insert(query.to_string(), SearchBehavior::Results(videos));
        self
    }

    pub fn failing_search(mut self, query: &str) -> Self {
        self.searches.insert(query.to_string(), SearchBehavior::Fail);
        self
    }

    /// Search panics with a message payload
    pub fn panicking(mut self, query: &str, message: &str) -> Self {
        self.searches
            .insert(query.to_string(), SearchBehavior::Panic(message.to_string()));
        self
    }

    /// Search panics with a payload that is not a message
    pub fn panicking_unknown(mut self, query: &str) -> Self {
        self.searches
            .insert(query.to_string(), SearchBehavior::PanicUnknown);
        self
    }

    pub fn slow(mut self, query: &str, delay: Duration, videos: Vec<Video>) -> Self {
        self.searches
            .insert(query.to_string(), SearchBehavior::Slow(delay, videos));
        self
    }

    pub fn with_detail(mut self, id: &str, description: &str) -> Self {
        self.details.insert(id.to_string(), description.to_string());
        self
    }

    pub fn failing_detail(mut self, id: &str) -> Self {
        self.failing_details.insert(id.to_string());
        self
    }

    /// Video and channel lookups for `id` answer not-found
    pub fn missing(mut self, id: &str) -> Self {
        self.missing.insert(id.to_string());
        self
    }

    pub fn with_tags(mut self, id: &str, tags: &[&str]) -> Self {
        self.tags
            .insert(id.to_string(), tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_channel(mut self, channel: Channel, uploads: Vec<Video>) -> Self {
        self.uploads.insert(channel.id.clone(), uploads);
        self.channels.insert(channel.id.clone(), channel);
        self
    }

    pub fn with_tagged(mut self, tag: &str, videos: Vec<Video>) -> Self {
        self.tagged.insert(tag.to_string(), videos);
        self
    }

    /// `count` argument of every uploads call so far
    pub fn upload_limits(&self) -> Vec<u32> {
        self.upload_limits.lock().unwrap().clone()
    }

    /// Queries searched so far, in call order
    pub fn searched(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoCatalog for FakeCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Video>, CatalogError> {
        self.search_calls.lock().unwrap().push(query.to_string());

        match self.searches.get(query).cloned() {
            Some(SearchBehavior::Results(videos)) => Ok(videos),
            Some(SearchBehavior::Fail) => Err(CatalogError::Api {
                status: 403,
                body: "quotaExceeded".to_string(),
            }),
            Some(SearchBehavior::Panic(message)) => panic!("{}", message),
            Some(SearchBehavior::PanicUnknown) => std::panic::panic_any(42u32),
            Some(SearchBehavior::Slow(delay, videos)) => {
                tokio::time::sleep(delay).await;
                Ok(videos)
            }
            None => Ok(vec![video(query)]),
        }
    }

    async fn fetch_description(&self, video_id: &str) -> Result<String, CatalogError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_details.contains(video_id) {
            return Err(CatalogError::Network(format!("reset while fetching {}", video_id)));
        }
        Ok(self
            .details
            .get(video_id)
            .cloned()
            .unwrap_or_else(|| format!("The full description of {}.", video_id)))
    }

    async fn fetch_video(&self, video_id: &str) -> Result<VideoDetails, CatalogError> {
        if self.missing.contains(video_id) {
            return Err(CatalogError::NotFound(format!("Video not found: {}", video_id)));
        }
        let mut entry = video(video_id);
        entry.description = self.fetch_description(video_id).await?;
        Ok(VideoDetails {
            video: entry,
            tags: self.tags.get(video_id).cloned().unwrap_or_default(),
        })
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<Channel, CatalogError> {
        self.channels
            .get(channel_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Channel not found: {}", channel_id)))
    }

    async fn channel_uploads(
        &self,
        channel_id: &str,
        count: u32,
    ) -> Result<Vec<Video>, CatalogError> {
        self.upload_limits.lock().unwrap().push(count);
        let mut videos = self.uploads.get(channel_id).cloned().unwrap_or_default();
        videos.truncate(count as usize);
        Ok(videos)
    }

    async fn search_tagged(&self, tag: &str) -> Result<Vec<Video>, CatalogError> {
        match self.searches.get(tag) {
            Some(SearchBehavior::Fail) => Err(CatalogError::Api {
                status: 403,
                body: "quotaExceeded".to_string(),
            }),
            _ => Ok(self.tagged.get(tag).cloned().unwrap_or_default()),
        }
    }
}

pub fn channel(id: &str) -> Channel {
    Channel {
        id: id.to_string(),
        name: format!("Channel {}", id),
        description: format!("About {}", id),
        image_url: format!("https://img.example/{}/avatar.jpg", id),
        subscriber_count: Some(1_000),
        video_count: Some(12),
    }
}

/// Mesh settings with a short ask timeout
pub fn mesh_settings() -> MeshSettings {
    MeshSettings {
        ask_timeout_ms: 300,
        ..MeshSettings::default()
    }
}

pub fn pipeline_with(
    catalog: Arc<FakeCatalog>,
    directory: ServiceDirectory,
    policy: DetailFailurePolicy,
) -> EnrichmentPipeline {
    EnrichmentPipeline::new(catalog, directory, mesh_settings().ask_timeout(), policy)
}

/// Pipeline over `catalog` with both real scoring services
pub async fn pipeline(catalog: Arc<FakeCatalog>) -> EnrichmentPipeline {
    let directory = spawn_default_services(8).await;
    pipeline_with(catalog, directory, DetailFailurePolicy::KeepSnippet)
}

/// Running supervisor over `catalog`
pub async fn start_mesh(
    catalog: Arc<FakeCatalog>,
) -> (SupervisorHandle, mpsc::UnboundedReceiver<SupervisorEvent>) {
    let pipeline = pipeline(catalog).await;
    Supervisor::spawn(pipeline, &mesh_settings())
}

pub async fn next_event(events: &mut mpsc::UnboundedReceiver<SupervisorEvent>) -> SupervisorEvent {
    tokio::time::timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for supervisor event")
        .expect("supervisor event stream closed")
}

/// Next payload pushed to a connection
pub async fn next_frame(outbound: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(WAIT, outbound.recv())
        .await
        .expect("timed out waiting for a result frame")
        .expect("outbound channel closed")
}

pub fn parse(frame: &str) -> serde_json::Value {
    serde_json::from_str(frame).expect("frame should be a JSON result")
}
