//! Worker fault classification and the supervision policy table

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Class of an uncaught worker fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Worker reached a state it cannot continue from (e.g. its reply sink is gone)
    InvalidState,
    /// Ordinary failure with a message; the worker can start over
    Failure,
    /// Anything the policy cannot classify
    Unknown,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaultKind::InvalidState => "invalid_state",
            FaultKind::Failure => "failure",
            FaultKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A classified worker fault
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} fault: {detail}")]
pub struct WorkerFault {
    pub kind: FaultKind,
    pub detail: String,
}

impl WorkerFault {
    pub fn new(kind: FaultKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Classify a panic payload: message payloads are ordinary failures
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        if let Some(msg) = payload.downcast_ref::<&'static str>() {
            Self::new(FaultKind::Failure, *msg)
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            Self::new(FaultKind::Failure, msg.clone())
        } else {
            Self::new(FaultKind::Unknown, "panic with non-message payload")
        }
    }
}

/// Supervisor reaction to a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Drop the worker and its registry entry for good
    Stop,
    /// Start a fresh worker for the same connection; history is lost
    Restart,
    /// Stop the worker and report to the supervisor's owner
    Escalate,
}

impl FaultKind {
    /// Policy table
    pub fn directive(self) -> Directive {
        match self {
            FaultKind::InvalidState => Directive::Stop,
            FaultKind::Failure => Directive::Restart,
            FaultKind::Unknown => Directive::Escalate,
        }
    }
}

/// Restarts granted to one connection identity inside a rolling window
#[derive(Debug, Clone)]
pub struct RestartBudget {
    max_restarts: u32,
    window: Duration,
    restarts: VecDeque<Instant>,
}

impl RestartBudget {
    pub fn new(max_restarts: u32, window: Duration) -> Self {
        Self {
            max_restarts,
            window,
            restarts: VecDeque::new(),
        }
    }

    /// Record a restart at `now` if the budget allows one
    pub fn try_consume(&mut self, now: Instant) -> bool {
        while let Some(&oldest) = self.restarts.front() {
            if now.duration_since(oldest) >= self.window {
                self.restarts.pop_front();
            } else {
                break;
            }
        }

        if self.restarts.len() >= self.max_restarts as usize {
            return false;
        }
        self.restarts.push_back(now);
        true
    }

    /// Restarts currently counted against the window
    pub fn used(&self) -> usize {
        self.restarts.len()
    }
}

/// Apply the policy table, demoting a restart to escalation once the budget is spent
pub fn decide(kind: FaultKind, budget: &mut RestartBudget, now: Instant) -> Directive {
    match kind.directive() {
        Directive::Restart if !budget.try_consume(now) => Directive::Escalate,
        directive => directive,
    }
}
