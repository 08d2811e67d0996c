//! Periodic refresh trigger

use super::SupervisorHandle;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Ask the supervisor to broadcast a refresh every `period`
///
/// The first trigger fires one full period after start. Stops when `cancel`
/// fires or the supervisor is gone.
pub fn spawn_ticker(
    supervisor: SupervisorHandle,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Refresh ticker started (period {:?})", period);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    debug!("Refresh tick");
                    if supervisor.broadcast_refresh().await.is_err() {
                        info!("Supervisor gone, ticker stopping");
                        break;
                    }
                }
            }
        }

        info!("Refresh ticker stopped");
    })
}
