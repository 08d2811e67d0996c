//! Supervised actor mesh
//!
//! # Architecture
//! - [`Supervisor`]: owns the connection → worker registry, routes inbound
//!   text, broadcasts refresh, and applies the failure policy. The registry is
//!   only touched from inside the supervisor's own loop.
//! - [`SessionWorker`]: one per connection, owns search history and starts
//!   pipeline runs.
//! - [`ConnectionGateway`]: one per live transport, turns transport events
//!   into supervisor messages.
//! - [`spawn_ticker`]: periodic refresh trigger.
//!
//! Every component is a task draining its own mailbox one message at a time.

pub mod connection;
pub mod policy;
pub mod supervisor;
pub mod ticker;
pub mod worker;

pub use connection::ConnectionGateway;
pub use policy::{decide, Directive, FaultKind, RestartBudget, WorkerFault};
pub use supervisor::{Supervisor, SupervisorEvent, SupervisorHandle};
pub use ticker::spawn_ticker;
pub use worker::{SessionWorker, WorkerCommand};

use thiserror::Error;
use tokio::sync::mpsc;

/// Sink for serialized payloads headed to one transport connection
pub type Outbound = mpsc::UnboundedSender<String>;

/// Failure to reach the supervisor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("Supervisor is not running")]
    SupervisorGone,

    #[error("Supervisor did not accept the message in time")]
    Timeout,
}
