//! Request/response service task with deadline-bounded asks

use super::TextScorer;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Failure of a deadline-bounded ask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AskError {
    /// No reply within the deadline
    #[error("Service did not answer in time")]
    Timeout,

    /// Service task is gone or dropped the request
    #[error("Service closed")]
    Closed,
}

/// One scoring request
pub struct ScoreJob<T> {
    pub descriptions: Vec<String>,
    pub reply: oneshot::Sender<T>,
}

/// Clonable address of a running service
pub struct ServiceHandle<T> {
    tx: mpsc::Sender<ScoreJob<T>>,
}

impl<T> Clone for ServiceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + 'static> ServiceHandle<T> {
    /// Handle plus the raw job receiver, for callers that serve jobs themselves
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ScoreJob<T>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Send `descriptions` and wait for the answer, at most `timeout` overall
    pub async fn ask(&self, descriptions: Vec<String>, timeout: Duration) -> Result<T, AskError> {
        let exchange = async {
            let (reply, answer) = oneshot::channel();
            self.tx
                .send(ScoreJob {
                    descriptions,
                    reply,
                })
                .await
                .map_err(|_| AskError::Closed)?;
            answer.await.map_err(|_| AskError::Closed)
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| AskError::Timeout)?
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Run `scorer` as a service task; jobs are handled one at a time
pub fn spawn_service<S: TextScorer>(scorer: S, capacity: usize) -> ServiceHandle<S::Output> {
    let (handle, mut rx) = ServiceHandle::channel(capacity);
    let name = scorer.name();

    tokio::spawn(async move {
        info!("Scoring service '{}' started", name);
        while let Some(job) = rx.recv().await {
            let count = job.descriptions.len();
            let output = scorer.score(&job.descriptions);
            if job.reply.send(output).is_err() {
                debug!(service = name, count, "Caller gave up before the answer was ready");
            }
        }
        info!("Scoring service '{}' stopped", name);
    });

    handle
}
