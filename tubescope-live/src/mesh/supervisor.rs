//! Supervisor: worker registry, routing, refresh broadcast and failure policy

use super::policy::{decide, Directive, RestartBudget, WorkerFault};
use super::worker::{SessionWorker, WorkerCommand, WorkerExit, WorkerMailbox};
use super::{MeshError, Outbound};
use crate::config::MeshSettings;
use crate::pipeline::EnrichmentPipeline;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tubescope_common::ConnectionId;

/// Lifecycle notification sent to the supervisor's owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    WorkerStarted {
        id: ConnectionId,
    },
    /// Worker faulted and was replaced; `restarts` counts the current window
    WorkerRestarted {
        id: ConnectionId,
        restarts: usize,
    },
    /// Worker removed, on disconnect (`fault: None`) or by policy
    WorkerStopped {
        id: ConnectionId,
        fault: Option<WorkerFault>,
    },
    /// Fault the supervisor would not handle itself; the worker is stopped
    Escalated {
        id: ConnectionId,
        fault: WorkerFault,
    },
}

/// Supervisor mailbox message
#[derive(Debug)]
pub enum SupervisorCommand {
    Connect { id: ConnectionId, outbound: Outbound },
    Disconnect { id: ConnectionId },
    Inbound { id: ConnectionId, text: String },
    BroadcastRefresh,
    LiveConnections(oneshot::Sender<usize>),
    History {
        id: ConnectionId,
        reply: oneshot::Sender<Vec<String>>,
    },
}

/// Clonable address of the supervisor
#[derive(Clone)]
pub struct SupervisorHandle {
    pub(crate) tx: mpsc::Sender<SupervisorCommand>,
}

impl SupervisorHandle {
    async fn send(&self, command: SupervisorCommand) -> Result<(), MeshError> {
        self.tx.send(command).await.map_err(|_| MeshError::SupervisorGone)
    }

    /// Send, giving up after `timeout` if the mailbox stays full
    pub async fn send_within(
        &self,
        command: SupervisorCommand,
        timeout: Duration,
    ) -> Result<(), MeshError> {
        self.tx.send_timeout(command, timeout).await.map_err(|e| match e {
            mpsc::error::SendTimeoutError::Timeout(_) => MeshError::Timeout,
            mpsc::error::SendTimeoutError::Closed(_) => MeshError::SupervisorGone,
        })
    }

    pub async fn connect(&self, id: ConnectionId, outbound: Outbound) -> Result<(), MeshError> {
        self.send(SupervisorCommand::Connect { id, outbound }).await
    }

    pub async fn disconnect(&self, id: ConnectionId) -> Result<(), MeshError> {
        self.send(SupervisorCommand::Disconnect { id }).await
    }

    pub async fn inbound(&self, id: ConnectionId, text: String) -> Result<(), MeshError> {
        self.send(SupervisorCommand::Inbound { id, text }).await
    }

    pub async fn broadcast_refresh(&self) -> Result<(), MeshError> {
        self.send(SupervisorCommand::BroadcastRefresh).await
    }

    /// Number of registered workers
    pub async fn live_connections(&self) -> Result<usize, MeshError> {
        let (reply, answer) = oneshot::channel();
        self.send(SupervisorCommand::LiveConnections(reply)).await?;
        answer.await.map_err(|_| MeshError::SupervisorGone)
    }

    /// History of the worker for `id`, oldest first; `None` when unregistered
    pub async fn history(&self, id: ConnectionId) -> Result<Option<Vec<String>>, MeshError> {
        let (reply, answer) = oneshot::channel();
        self.send(SupervisorCommand::History { id, reply }).await?;
        Ok(answer.await.ok())
    }

    /// Whether the supervisor task has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

struct WorkerEntry {
    generation: u64,
    mailbox: mpsc::UnboundedSender<WorkerCommand>,
    cancel: CancellationToken,
    outbound: Outbound,
    budget: RestartBudget,
}

struct WorkerExited {
    id: ConnectionId,
    generation: u64,
    outcome: Result<(WorkerExit, WorkerMailbox), JoinError>,
}

/// Supervisor actor state; lives entirely inside its own task
pub struct Supervisor {
    registry: HashMap<ConnectionId, WorkerEntry>,
    pipeline: EnrichmentPipeline,
    history_capacity: usize,
    max_restarts: u32,
    restart_window: Duration,
    next_generation: u64,
    exits_tx: mpsc::UnboundedSender<WorkerExited>,
    events: mpsc::UnboundedSender<SupervisorEvent>,
}

impl Supervisor {
    /// Start the supervisor task
    ///
    /// Returns its handle and the owner's event stream. The supervisor stops,
    /// cancelling every worker, once all handles are dropped.
    pub fn spawn(
        pipeline: EnrichmentPipeline,
        settings: &MeshSettings,
    ) -> (SupervisorHandle, mpsc::UnboundedReceiver<SupervisorEvent>) {
        let (tx, commands) = mpsc::channel(settings.mailbox_capacity.max(1));
        let (exits_tx, exits) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();

        let supervisor = Supervisor {
            registry: HashMap::new(),
            pipeline,
            history_capacity: settings.history_capacity,
            max_restarts: settings.max_restarts,
            restart_window: settings.restart_window(),
            next_generation: 0,
            exits_tx,
            events,
        };
        tokio::spawn(supervisor.run(commands, exits));

        (SupervisorHandle { tx }, events_rx)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<SupervisorCommand>,
        mut exits: mpsc::UnboundedReceiver<WorkerExited>,
    ) {
        info!("Supervisor started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(exited) = exits.recv() => self.handle_exit(exited),
            }
        }

        for (_, entry) in self.registry.drain() {
            entry.cancel.cancel();
        }
        info!("Supervisor stopped");
    }

    fn handle_command(&mut self, command: SupervisorCommand) {
        match command {
            SupervisorCommand::Connect { id, outbound } => self.on_connect(id, outbound),
            SupervisorCommand::Disconnect { id } => self.on_disconnect(id),
            SupervisorCommand::Inbound { id, text } => self.on_inbound(id, text),
            SupervisorCommand::BroadcastRefresh => self.broadcast_refresh(),
            SupervisorCommand::LiveConnections(reply) => {
                let _ = reply.send(self.registry.len());
            }
            SupervisorCommand::History { id, reply } => {
                // A miss drops `reply`, which the handle reports as None
                if let Some(entry) = self.registry.get(&id) {
                    let _ = entry.mailbox.send(WorkerCommand::History(reply));
                }
            }
        }
    }

    fn on_connect(&mut self, id: ConnectionId, outbound: Outbound) {
        let budget = RestartBudget::new(self.max_restarts, self.restart_window);
        let (mailbox, mailbox_rx) = mpsc::unbounded_channel();
        let entry = self.start_worker(id, outbound, mailbox, mailbox_rx, budget);

        if let Some(previous) = self.registry.insert(id, entry) {
            warn!(connection = %id, "Duplicate connect, replacing existing worker");
            previous.cancel.cancel();
        }

        info!(connection = %id, live = self.registry.len(), "Connection registered");
        self.notify(SupervisorEvent::WorkerStarted { id });
    }

    fn on_disconnect(&mut self, id: ConnectionId) {
        match self.registry.remove(&id) {
            Some(entry) => {
                entry.cancel.cancel();
                info!(connection = %id, live = self.registry.len(), "Connection removed");
                self.notify(SupervisorEvent::WorkerStopped { id, fault: None });
            }
            None => debug!(connection = %id, "Disconnect for unknown connection ignored"),
        }
    }

    fn on_inbound(&mut self, id: ConnectionId, text: String) {
        match self.registry.get(&id) {
            Some(entry) => {
                if entry.mailbox.send(WorkerCommand::Query(text)).is_err() {
                    debug!(connection = %id, "Worker mailbox closed, message dropped");
                }
            }
            None => debug!(connection = %id, "No worker for connection, message dropped"),
        }
    }

    fn broadcast_refresh(&mut self) {
        debug!(workers = self.registry.len(), "Broadcasting refresh");
        for (id, entry) in &self.registry {
            if entry.mailbox.send(WorkerCommand::Refresh).is_err() {
                debug!(connection = %id, "Worker mailbox closed, refresh skipped");
            }
        }
    }

    fn handle_exit(&mut self, exited: WorkerExited) {
        let WorkerExited {
            id,
            generation,
            outcome,
        } = exited;

        let current = self
            .registry
            .get(&id)
            .map_or(false, |entry| entry.generation == generation);
        if !current {
            // Disconnected or replaced; nothing to supervise
            debug!(connection = %id, generation, "Retired worker exited");
            return;
        }

        let (fault, mailbox_rx) = match outcome {
            Ok((WorkerExit::Faulted(fault), mailbox_rx)) => (fault, Some(mailbox_rx)),
            Ok((WorkerExit::Cancelled, _)) => {
                self.registry.remove(&id);
                warn!(connection = %id, "Worker stopped on its own, entry removed");
                self.notify(SupervisorEvent::WorkerStopped { id, fault: None });
                return;
            }
            Err(e) if e.is_panic() => (WorkerFault::from_panic(e.into_panic()), None),
            Err(e) => {
                self.registry.remove(&id);
                warn!(connection = %id, error = %e, "Worker task cancelled, entry removed");
                self.notify(SupervisorEvent::WorkerStopped { id, fault: None });
                return;
            }
        };

        let Some(mut entry) = self.registry.remove(&id) else {
            return;
        };
        let directive = decide(fault.kind, &mut entry.budget, Instant::now());

        match directive {
            Directive::Restart => {
                let restarts = entry.budget.used();
                warn!(connection = %id, %fault, restarts, "Restarting worker, history reset");

                let (mailbox, mailbox_rx) = match mailbox_rx {
                    Some(rx) => (entry.mailbox, rx),
                    None => mpsc::unbounded_channel(),
                };
                let replacement =
                    self.start_worker(id, entry.outbound, mailbox, mailbox_rx, entry.budget);
                self.registry.insert(id, replacement);
                self.notify(SupervisorEvent::WorkerRestarted { id, restarts });
            }
            Directive::Stop => {
                entry.cancel.cancel();
                warn!(connection = %id, %fault, "Stopping worker permanently");
                self.notify(SupervisorEvent::WorkerStopped {
                    id,
                    fault: Some(fault),
                });
            }
            Directive::Escalate => {
                entry.cancel.cancel();
                error!(connection = %id, %fault, "Escalating worker fault");
                self.notify(SupervisorEvent::Escalated { id, fault });
            }
        }
    }

    fn start_worker(
        &mut self,
        id: ConnectionId,
        outbound: Outbound,
        mailbox: mpsc::UnboundedSender<WorkerCommand>,
        mailbox_rx: WorkerMailbox,
        budget: RestartBudget,
    ) -> WorkerEntry {
        self.next_generation += 1;
        let generation = self.next_generation;
        let cancel = CancellationToken::new();

        let worker = SessionWorker::new(
            id,
            self.history_capacity,
            self.pipeline.clone(),
            outbound.clone(),
        );
        let task = tokio::spawn(worker.run(mailbox_rx, cancel.clone()));

        // Liveness watch: report the exit back into the supervisor loop
        let exits = self.exits_tx.clone();
        tokio::spawn(async move {
            let outcome = task.await;
            let _ = exits.send(WorkerExited {
                id,
                generation,
                outcome,
            });
        });

        WorkerEntry {
            generation,
            mailbox,
            cancel,
            outbound,
            budget,
        }
    }

    fn notify(&self, event: SupervisorEvent) {
        let _ = self.events.send(event);
    }
}
