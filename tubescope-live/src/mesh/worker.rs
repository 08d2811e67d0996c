//! Per-connection session worker
//!
//! Owns the connection's [`SearchHistory`] and starts one pipeline run per
//! query or per remembered query on refresh. Runs execute as tasks in a
//! [`JoinSet`] so the mailbox keeps draining while network calls are pending;
//! a panicking run is a worker fault and is reported to the supervisor.
//!
//! When the worker stops, outstanding runs are detached rather than aborted.
//! They finish their calls (bounded by the catalog and ask timeouts) and
//! their delivery becomes a no-op once the connection is gone.

use super::policy::{FaultKind, WorkerFault};
use super::Outbound;
use crate::pipeline::EnrichmentPipeline;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use tubescope_common::{ConnectionId, Origin, SearchHistory};

/// Message accepted by a session worker
#[derive(Debug)]
pub enum WorkerCommand {
    /// Raw query text from the client
    Query(String),
    /// Replay every remembered query
    Refresh,
    /// Snapshot of the history, oldest first
    History(oneshot::Sender<Vec<String>>),
}

pub type WorkerMailbox = mpsc::UnboundedReceiver<WorkerCommand>;

/// Why a worker loop ended
#[derive(Debug)]
pub enum WorkerExit {
    /// Cancelled by the supervisor, or its mailbox closed
    Cancelled,
    Faulted(WorkerFault),
}

pub struct SessionWorker {
    id: ConnectionId,
    history: SearchHistory,
    pipeline: EnrichmentPipeline,
    outbound: Outbound,
    runs: JoinSet<()>,
}

impl SessionWorker {
    /// Fresh worker with empty history
    pub fn new(
        id: ConnectionId,
        history_capacity: usize,
        pipeline: EnrichmentPipeline,
        outbound: Outbound,
    ) -> Self {
        Self {
            id,
            history: SearchHistory::new(history_capacity),
            pipeline,
            outbound,
            runs: JoinSet::new(),
        }
    }

    /// Process the mailbox one message at a time until cancelled or faulted
    ///
    /// The mailbox is handed back so a restarted worker can keep draining it.
    pub async fn run(
        mut self,
        mut mailbox: WorkerMailbox,
        cancel: CancellationToken,
    ) -> (WorkerExit, WorkerMailbox) {
        debug!(connection = %self.id, "Session worker started");

        let exit = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break WorkerExit::Cancelled,

                Some(joined) = self.runs.join_next(), if !self.runs.is_empty() => {
                    if let Err(e) = joined {
                        if let Some(fault) = fault_from_join_error(e) {
                            break WorkerExit::Faulted(fault);
                        }
                    }
                }

                command = mailbox.recv() => match command {
                    Some(command) => {
                        if let Err(fault) = self.handle(command) {
                            break WorkerExit::Faulted(fault);
                        }
                    }
                    None => break WorkerExit::Cancelled,
                },
            }
        };

        let detached = self.runs.len();
        self.runs.detach_all();
        debug!(connection = %self.id, detached, exit = ?exit, "Session worker stopped");

        (exit, mailbox)
    }

    fn handle(&mut self, command: WorkerCommand) -> Result<(), WorkerFault> {
        match command {
            WorkerCommand::Query(text) => {
                self.ensure_reachable("query")?;
                if let Some(evicted) = self.history.record(&text) {
                    debug!(connection = %self.id, evicted = %evicted, "History full, evicted oldest query");
                }
                self.spawn_run(text, Origin::Request);
            }
            WorkerCommand::Refresh => {
                // Connection gone without a disconnect: stop instead of replaying
                self.ensure_reachable("refresh")?;
                let queries = self.history.snapshot();
                debug!(connection = %self.id, count = queries.len(), "Replaying history");
                for query in queries {
                    self.spawn_run(query, Origin::Refresh);
                }
            }
            WorkerCommand::History(reply) => {
                let _ = reply.send(self.history.snapshot());
            }
        }
        Ok(())
    }

    fn ensure_reachable(&self, command: &str) -> Result<(), WorkerFault> {
        if self.outbound.is_closed() {
            return Err(WorkerFault::new(
                FaultKind::InvalidState,
                format!("{} received after the connection's reply sink closed", command),
            ));
        }
        Ok(())
    }

    fn spawn_run(&mut self, query: String, origin: Origin) {
        let pipeline = self.pipeline.clone();
        let outbound = self.outbound.clone();
        let id = self.id;

        self.runs.spawn(async move {
            let payload = match pipeline.run(&query, origin).await {
                Ok(result) => match result.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        error!(connection = %id, query = %query, error = %e, "Failed to serialize result");
                        return;
                    }
                },
                Err(e) => {
                    warn!(connection = %id, error = %e, "Pipeline run failed");
                    e.error_message()
                }
            };

            if outbound.send(payload).is_err() {
                debug!(connection = %id, query = %query, "Connection gone, result dropped");
            }
        });
    }
}

/// `None` for runs that were cancelled rather than panicking
fn fault_from_join_error(e: JoinError) -> Option<WorkerFault> {
    if e.is_panic() {
        Some(WorkerFault::from_panic(e.into_panic()))
    } else {
        None
    }
}
