//! tubescope-live library - live video search with enrichment
//!
//! A supervised mesh of per-connection session workers. Each worker keeps a
//! short search history, runs the enrichment pipeline (catalog search,
//! detail fan-out, readability and sentiment scoring) for every query, and
//! replays its history whenever the refresh ticker fires.
//!
//! Alongside the live mesh, plain HTTP endpoints browse the catalog: one
//! video, one channel with its latest uploads, videos by tag, and word
//! statistics for a keyword.

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod mesh;
pub mod pipeline;
pub mod scoring;

use catalog::VideoCatalog;
use config::MeshSettings;
use mesh::SupervisorHandle;
use pipeline::EnrichmentPipeline;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Address of the running supervisor
    pub supervisor: SupervisorHandle,
    /// Pipeline used by the one-shot search endpoint
    pub pipeline: EnrichmentPipeline,
    /// Catalog behind the browse endpoints (same one the pipeline searches)
    pub catalog: Arc<dyn VideoCatalog>,
    /// Deadline for gateway → supervisor handoff
    pub ask_timeout: Duration,
    pub refresh_period_secs: u64,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        supervisor: SupervisorHandle,
        pipeline: EnrichmentPipeline,
        settings: &MeshSettings,
    ) -> Self {
        Self {
            supervisor,
            catalog: pipeline.catalog(),
            pipeline,
            ask_timeout: settings.ask_timeout(),
            refresh_period_secs: settings.refresh_period_secs,
            started_at: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/ws", get(api::ws_handler))
        .route("/api/search", get(api::search))
        .route("/api/status", get(api::get_status))
        .route("/api/words", get(api::word_stats))
        .route("/api/tags", get(api::search_tags))
        .route("/api/video/:id", get(api::video_details))
        .route("/api/channel/:id", get(api::channel_profile))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
