//! Periodic heartbeat loop.
//!
//! Runs once per second for the life of the process: every tick drives the
//! pulse machine, and every third tick sends a `PING` to the device with the
//! result discarded. Unlike the original deployment, the loop observes a
//! [`CancellationToken`] and exits promptly on shutdown.
//!
//! Each tick is isolated: every operation in the tick body reports failure
//! as a logged boolean, so no single failure can stop subsequent ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use rangehub_core::DeviceState;
use rangehub_core::constants::{HEARTBEAT_INTERVAL_MS, PING_EVERY_TICKS};
use rangehub_network::CommandSender;
use rangehub_protocol::Command;

use crate::machine::PulseMachine;

/// Configuration for the heartbeat loop.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Tick period.
    pub interval: Duration,

    /// A PING goes out every this many ticks.
    pub ping_every: u32,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(HEARTBEAT_INTERVAL_MS),
            ping_every: PING_EVERY_TICKS,
        }
    }
}

/// The 1 Hz driver behind the pulse machine and the liveness probe.
pub struct HeartbeatDriver<S> {
    config: HeartbeatConfig,
    state: Arc<DeviceState>,
    sender: Arc<S>,
    machine: Arc<PulseMachine<S>>,
}

impl<S: CommandSender> HeartbeatDriver<S> {
    pub fn new(
        config: HeartbeatConfig,
        state: Arc<DeviceState>,
        sender: Arc<S>,
        machine: Arc<PulseMachine<S>>,
    ) -> Self {
        Self {
            config,
            state,
            sender,
            machine,
        }
    }

    /// Tick until the token is cancelled.
    ///
    /// The first tick fires one full interval after start, matching a plain
    /// delay loop rather than an immediate first tick.
    pub async fn run(self, shutdown: CancellationToken) {
        let start = tokio::time::Instant::now() + self.config.interval;
        let mut interval = tokio::time::interval_at(start, self.config.interval);

        let mut tick: u32 = 0;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Heartbeat shutting down");
                    break;
                }
                _ = interval.tick() => {
                    tick = tick.wrapping_add(1);

                    if self.config.ping_every > 0 && tick % self.config.ping_every == 0 {
                        let addr = self.state.device_addr_or_fallback();
                        debug!(addr = %addr, "Sending PING");
                        // Liveness probe only; the outcome is discarded.
                        let _ = self.sender.send(Command::ping(), addr).await;
                    }

                    trace!(tick, "Heartbeat tick");
                    self.machine.tick().await;
                }
            }
        }
    }
}
