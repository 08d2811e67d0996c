//! Enrichment pipeline
//!
//! # Stages
//! 1. **Search**: one catalog search for the query. Failure aborts the run.
//! 2. **Detail fan-out**: one detail fetch per item, all concurrent, full
//!    barrier before the next stage. A failed item keeps its search snippet
//!    or aborts the run, depending on [`DetailFailurePolicy`].
//! 3. **Scoring**: readability and sentiment, each resolved by name and asked
//!    with a deadline, run concurrently. Either may degrade independently:
//!    readability to null scores, sentiment to neutral.
//! 4. **Assembly** into an [`EnrichedResult`].

use crate::catalog::{CatalogError, VideoCatalog};
use crate::config::{DetailFailurePolicy, MeshSettings};
use crate::scoring::{
    ReadabilityReport, ServiceDirectory, READABILITY_SERVICE, SENTIMENT_SERVICE,
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use tubescope_common::{EnrichedItem, EnrichedResult, Origin, Sentiment, Video};

/// Non-recoverable pipeline failure
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Search failed for '{query}': {source}")]
    Search {
        query: String,
        #[source]
        source: CatalogError,
    },

    #[error("Detail fetch failed for '{query}' (video {video_id}): {source}")]
    Detail {
        query: String,
        video_id: String,
        #[source]
        source: CatalogError,
    },
}

impl PipelineError {
    pub fn query(&self) -> &str {
        match self {
            PipelineError::Search { query, .. } | PipelineError::Detail { query, .. } => query,
        }
    }

    /// Error string delivered to the client in place of a result
    pub fn error_message(&self) -> String {
        format!("ERROR: Unable to fetch videos for keyword: {}", self.query())
    }
}

/// Shared, stateless pipeline; cheap to clone into per-run tasks
#[derive(Clone)]
pub struct EnrichmentPipeline {
    catalog: Arc<dyn VideoCatalog>,
    directory: ServiceDirectory,
    ask_timeout: Duration,
    detail_failure: DetailFailurePolicy,
}

impl EnrichmentPipeline {
    pub fn new(
        catalog: Arc<dyn VideoCatalog>,
        directory: ServiceDirectory,
        ask_timeout: Duration,
        detail_failure: DetailFailurePolicy,
    ) -> Self {
        Self {
            catalog,
            directory,
            ask_timeout,
            detail_failure,
        }
    }

    pub fn from_settings(
        catalog: Arc<dyn VideoCatalog>,
        directory: ServiceDirectory,
        settings: &MeshSettings,
    ) -> Self {
        Self::new(catalog, directory, settings.ask_timeout(), settings.detail_failure)
    }

    /// Catalog the pipeline searches
    pub fn catalog(&self) -> Arc<dyn VideoCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn detail_failure(&self) -> DetailFailurePolicy {
        self.detail_failure
    }

    /// Run all stages for `query`
    pub async fn run(&self, query: &str, origin: Origin) -> Result<EnrichedResult, PipelineError> {
        let started = std::time::Instant::now();

        // Stage 1: search
        let videos = self
            .catalog
            .search(query)
            .await
            .map_err(|source| PipelineError::Search {
                query: query.to_string(),
                source,
            })?;
        debug!(query = %query, count = videos.len(), "Search stage complete");

        // Stage 2: detail fan-out
        let videos = self.fetch_details(query, videos).await?;
        let descriptions: Vec<String> = videos.iter().map(|v| v.description.clone()).collect();

        // Stage 3: scoring, concurrently
        let (readability, sentiment) = tokio::join!(
            self.score_readability(query, descriptions.clone()),
            self.score_sentiment(query, descriptions),
        );

        // Stage 4: assembly
        let result = assemble(query, origin, videos, readability, sentiment);

        info!(
            query = %query,
            origin = ?origin,
            items = result.items.len(),
            sentiment = %result.sentiment,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pipeline run complete"
        );
        Ok(result)
    }

    async fn fetch_details(
        &self,
        query: &str,
        videos: Vec<Video>,
    ) -> Result<Vec<Video>, PipelineError> {
        let catalog = &self.catalog;
        let fetches = videos.iter().map(|video| catalog.fetch_description(&video.id));
        let outcomes = join_all(fetches).await;

        let mut enriched = Vec::with_capacity(videos.len());
        for (mut video, outcome) in videos.into_iter().zip(outcomes) {
            match outcome {
                Ok(description) => {
                    video.description = description;
                    enriched.push(video);
                }
                Err(source) => match self.detail_failure {
                    DetailFailurePolicy::KeepSnippet => {
                        warn!(
                            query = %query,
                            video_id = %video.id,
                            error = %source,
                            "Detail fetch failed, keeping search snippet"
                        );
                        enriched.push(video);
                    }
                    DetailFailurePolicy::Abort => {
                        return Err(PipelineError::Detail {
                            query: query.to_string(),
                            video_id: video.id,
                            source,
                        });
                    }
                },
            }
        }

        Ok(enriched)
    }

    async fn score_readability(
        &self,
        query: &str,
        descriptions: Vec<String>,
    ) -> Option<ReadabilityReport> {
        let service = match self
            .directory
            .resolve::<ReadabilityReport>(READABILITY_SERVICE, self.ask_timeout)
            .await
        {
            Ok(service) => service,
            Err(e) => {
                warn!(query = %query, error = %e, "Readability unavailable, continuing without scores");
                return None;
            }
        };

        match service.ask(descriptions, self.ask_timeout).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(query = %query, error = %e, "Readability scoring failed, continuing without scores");
                None
            }
        }
    }

    async fn score_sentiment(&self, query: &str, descriptions: Vec<String>) -> Sentiment {
        let service = match self
            .directory
            .resolve::<Sentiment>(SENTIMENT_SERVICE, self.ask_timeout)
            .await
        {
            Ok(service) => service,
            Err(e) => {
                warn!(query = %query, error = %e, "Sentiment unavailable, reporting neutral");
                return Sentiment::Neutral;
            }
        };

        service
            .ask(descriptions, self.ask_timeout)
            .await
            .unwrap_or_else(|e| {
                warn!(query = %query, error = %e, "Sentiment scoring failed, reporting neutral");
                Sentiment::Neutral
            })
    }
}

fn assemble(
    query: &str,
    origin: Origin,
    videos: Vec<Video>,
    readability: Option<ReadabilityReport>,
    sentiment: Sentiment,
) -> EnrichedResult {
    // A report that does not line up with the items is treated as missing
    let readability = readability.filter(|r| r.items.len() == videos.len());

    let (items, average_grade, average_score) = match readability {
        Some(report) => {
            let items = videos
                .into_iter()
                .zip(report.items)
                .map(|(video, score)| EnrichedItem {
                    video,
                    readability_grade: Some(score.grade),
                    readability_score: Some(score.score),
                })
                .collect();
            (items, report.average_grade, report.average_score)
        }
        None => (
            videos.into_iter().map(EnrichedItem::unscored).collect(),
            None,
            None,
        ),
    };

    EnrichedResult {
        query: query.to_string(),
        average_readability_grade: average_grade,
        average_readability_score: average_score,
        sentiment,
        origin,
        items,
    }
}
