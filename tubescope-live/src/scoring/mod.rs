//! Scoring services
//!
//! Readability and sentiment are pure functions over description text. Each
//! runs as its own service task behind a [`ServiceHandle`], registered in the
//! [`ServiceDirectory`] under a stable logical name. Callers resolve the name
//! and ask with a deadline, so a slow or missing scorer degrades the result
//! instead of blocking the pipeline.
//!
//! [`word_frequencies`] backs the word-statistics endpoint and is called
//! directly.

pub mod directory;
pub mod readability;
pub mod sentiment;
pub mod service;
pub mod words;

pub use directory::{ResolveError, ServiceDirectory};
pub use readability::{ReadabilityReport, ReadabilityScore, ReadabilityScorer};
pub use sentiment::SentimentScorer;
pub use service::{spawn_service, AskError, ScoreJob, ServiceHandle};
pub use words::word_frequencies;

/// Logical name of the readability service
pub const READABILITY_SERVICE: &str = "description-readability";

/// Logical name of the sentiment service
pub const SENTIMENT_SERVICE: &str = "sentiment-analyzer";

/// A stateless scorer over a batch of descriptions
pub trait TextScorer: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Logical name the scorer registers under
    fn name(&self) -> &'static str;

    fn score(&self, descriptions: &[String]) -> Self::Output;
}

/// Spawn both scorers and register them in a fresh directory
pub async fn spawn_default_services(mailbox_capacity: usize) -> ServiceDirectory {
    let directory = ServiceDirectory::new();
    directory
        .register(READABILITY_SERVICE, spawn_service(ReadabilityScorer, mailbox_capacity))
        .await;
    directory
        .register(SENTIMENT_SERVICE, spawn_service(SentimentScorer, mailbox_capacity))
        .await;
    directory
}
