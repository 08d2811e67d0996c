//! Connection gateway: one per live transport connection

use super::supervisor::{SupervisorCommand, SupervisorHandle};
use super::{MeshError, Outbound};
use std::time::Duration;
use tracing::{debug, warn};
use tubescope_common::ConnectionId;

/// Bridges one transport connection to the supervisor
///
/// Opening registers a new worker; closing (or dropping) the gateway
/// unregisters it. Replies flow back through the `Outbound` sink passed to
/// [`ConnectionGateway::open`].
pub struct ConnectionGateway {
    id: ConnectionId,
    supervisor: SupervisorHandle,
    timeout: Duration,
    closed: bool,
}

impl ConnectionGateway {
    /// Allocate an identity and notify the supervisor of the new connection
    pub async fn open(
        supervisor: SupervisorHandle,
        outbound: Outbound,
        timeout: Duration,
    ) -> Result<Self, MeshError> {
        let id = ConnectionId::new();
        supervisor
            .send_within(SupervisorCommand::Connect { id, outbound }, timeout)
            .await?;
        debug!(connection = %id, "Connection gateway opened");

        Ok(Self {
            id,
            supervisor,
            timeout,
            closed: false,
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Forward raw inbound text, tagged with this connection's identity
    ///
    /// Returns `false` when the message was dropped; that is logged, never retried.
    pub async fn forward(&self, text: String) -> bool {
        let command = SupervisorCommand::Inbound { id: self.id, text };
        match self.supervisor.send_within(command, self.timeout).await {
            Ok(()) => true,
            Err(e) => {
                warn!(connection = %self.id, error = %e, "Inbound message dropped");
                false
            }
        }
    }

    /// Notify the supervisor that the transport went away
    pub async fn close(mut self) {
        self.closed = true;
        let command = SupervisorCommand::Disconnect { id: self.id };
        if let Err(e) = self.supervisor.send_within(command, self.timeout).await {
            warn!(connection = %self.id, error = %e, "Disconnect notification lost");
        }
        debug!(connection = %self.id, "Connection gateway closed");
    }
}

impl Drop for ConnectionGateway {
    fn drop(&mut self) {
        if !self.closed {
            // Best effort; the supervisor also drops the entry when the worker dies
            if let Err(e) = self
                .supervisor
                .tx
                .try_send(SupervisorCommand::Disconnect { id: self.id })
            {
                warn!(connection = %self.id, error = %e, "Disconnect on drop failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn detached_supervisor(capacity: usize) -> (SupervisorHandle, mpsc::Receiver<SupervisorCommand>) {
        let (tx, rx) = mpsc::channel(capacity);
        (SupervisorHandle { tx }, rx)
    }

    #[tokio::test]
    async fn test_lifecycle_messages() {
        let (supervisor, mut rx) = detached_supervisor(8);
        let (outbound, _outbound_rx) = mpsc::unbounded_channel();

        let gateway = ConnectionGateway::open(supervisor, outbound, Duration::from_secs(2))
            .await
            .unwrap();
        let id = gateway.id();

        assert!(matches!(rx.recv().await, Some(SupervisorCommand::Connect { id: got, .. }) if got == id));

        assert!(gateway.forward("rust".to_string()).await);
        match rx.recv().await {
            Some(SupervisorCommand::Inbound { id: got, text }) => {
                assert_eq!(got, id);
                assert_eq!(text, "rust");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        gateway.close().await;
        assert!(matches!(rx.recv().await, Some(SupervisorCommand::Disconnect { id: got }) if got == id));
        assert!(rx.try_recv().is_err(), "close must not send a second disconnect");
    }

    #[tokio::test]
    async fn test_drop_sends_disconnect() {
        let (supervisor, mut rx) = detached_supervisor(8);
        let (outbound, _outbound_rx) = mpsc::unbounded_channel();

        let gateway = ConnectionGateway::open(supervisor, outbound, Duration::from_secs(2))
            .await
            .unwrap();
        let id = gateway.id();
        drop(gateway);

        let _connect = rx.recv().await;
        assert!(matches!(rx.recv().await, Some(SupervisorCommand::Disconnect { id: got }) if got == id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_forward_drops_when_supervisor_is_full() {
        let (supervisor, mut rx) = detached_supervisor(1);
        let (outbound, _outbound_rx) = mpsc::unbounded_channel();

        let gateway = ConnectionGateway::open(supervisor, outbound, Duration::from_secs(2))
            .await
            .unwrap();

        // Connect occupies the only slot and is never drained
        assert!(!gateway.forward("stuck".to_string()).await);

        let _connect = rx.recv().await;
        assert!(gateway.forward("flows".to_string()).await);
    }

    #[tokio::test]
    async fn test_open_fails_without_supervisor() {
        let (supervisor, rx) = detached_supervisor(1);
        drop(rx);
        let (outbound, _outbound_rx) = mpsc::unbounded_channel();

        let result = ConnectionGateway::open(supervisor, outbound, Duration::from_secs(2)).await;
        assert_eq!(result.err(), Some(MeshError::SupervisorGone));
    }
}
