//! Debounced off/recovery state machine.
//!
//! The machine decides, once per heartbeat tick, whether to command the
//! device off, and when to allow it back on. Two transitions are evaluated
//! each tick, in order:
//!
//! 1. **Off trigger** — the most recent "far" observation is at least the
//!    grace period old, no off has been confirmed, and the retry backoff has
//!    elapsed: attempt an `OFF` send. Success marks `off_sent`; failure
//!    schedules the next attempt one backoff later.
//! 2. **Recovery** — an off has been confirmed and the most recent "close"
//!    observation is at least the recovery window old: clear `off_sent` and
//!    impose the same backoff before the trigger may fire again, which
//!    prevents command flapping when the distance oscillates near the
//!    threshold.
//!
//! There is no terminal state; the machine runs for the life of the process.
//! The field lock is held for assignments only — the send itself happens
//! outside it.

use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use rangehub_core::DeviceState;
use rangehub_core::constants::{
    CLOSE_RECOVERY_MS, DISTANCE_THRESHOLD_MM, FAR_GRACE_MS, RETRY_BACKOFF_MS,
};
use rangehub_network::CommandSender;
use rangehub_protocol::Command;

/// Timing and threshold configuration for the pulse machine.
///
/// # Example
///
/// ```
/// use rangehub_pulse::PulseConfig;
///
/// let config = PulseConfig::default();
/// assert_eq!(config.threshold_mm, 2000);
/// assert_eq!(config.grace.as_millis(), 500);
/// ```
#[derive(Debug, Clone)]
pub struct PulseConfig {
    /// Close/far boundary in millimeters. Kept at the shipped 2000 mm even
    /// though the original described it as "30 cm"; see
    /// [`rangehub_core::constants::DISTANCE_THRESHOLD_MM`].
    pub threshold_mm: i64,

    /// Minimum age of the last far observation before an off is attempted.
    pub grace: Duration,

    /// Minimum age of the last close observation before a confirmed off is
    /// re-armed.
    pub recovery: Duration,

    /// Delay imposed after a failed off attempt, and after recovery, before
    /// another attempt is permitted.
    pub retry_backoff: Duration,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            threshold_mm: DISTANCE_THRESHOLD_MM,
            grace: Duration::from_millis(FAR_GRACE_MS),
            recovery: Duration::from_millis(CLOSE_RECOVERY_MS),
            retry_backoff: Duration::from_millis(RETRY_BACKOFF_MS),
        }
    }
}

/// Mutable pulse fields, guarded as one unit.
#[derive(Debug)]
struct Fields {
    /// When a reading at or under the threshold was last observed.
    last_seen_close: Instant,

    /// When a reading over the threshold was last observed. `None` until
    /// the first far reading, so the off trigger cannot fire on a device
    /// that has never reported far.
    last_seen_far: Option<Instant>,

    /// Earliest instant at which another off attempt is permitted.
    /// `None` means no backoff is in effect.
    next_retry_at: Option<Instant>,

    /// True only after a confirmed successful off send.
    off_sent: bool,
}

/// The debounce/retry state machine.
///
/// Generic over the [`CommandSender`] seam so tests can drive it against a
/// fake transport. Distance observations arrive from the telemetry
/// processor on session tasks; ticks arrive from the heartbeat driver.
/// Both paths take the same short field lock.
pub struct PulseMachine<S> {
    config: PulseConfig,
    state: Arc<DeviceState>,
    sender: Arc<S>,
    fields: Mutex<Fields>,
}

impl<S: CommandSender> PulseMachine<S> {
    pub fn new(config: PulseConfig, state: Arc<DeviceState>, sender: Arc<S>) -> Self {
        Self {
            config,
            state,
            sender,
            fields: Mutex::new(Fields {
                last_seen_close: Instant::now(),
                last_seen_far: None,
                next_retry_at: None,
                off_sent: false,
            }),
        }
    }

    /// Record one distance observation against the close/far threshold.
    pub fn observe_distance(&self, millimeters: i64) {
        let now = Instant::now();
        let mut f = self.lock();
        if millimeters <= self.config.threshold_mm {
            f.last_seen_close = now;
        } else {
            f.last_seen_far = Some(now);
        }
    }

    /// Evaluate both transitions once. Called at every heartbeat tick.
    pub async fn tick(&self) {
        let now = Instant::now();

        let need_off = {
            let f = self.lock();
            !f.off_sent
                && f.last_seen_far
                    .is_some_and(|t| now.duration_since(t) >= self.config.grace)
                && f.next_retry_at.is_none_or(|t| now >= t)
        };

        if need_off {
            let addr: IpAddr = self.state.device_addr_or_fallback();
            let sent = self.sender.send(Command::off(), addr).await;

            let mut f = self.lock();
            if sent {
                info!(addr = %addr, "Sent OFF (object out of range)");
                f.off_sent = true;
            } else {
                warn!(
                    addr = %addr,
                    backoff_ms = self.config.retry_backoff.as_millis() as u64,
                    "OFF send failed, backing off"
                );
                f.next_retry_at = Some(now + self.config.retry_backoff);
            }
        }

        let mut f = self.lock();
        if f.off_sent && now.duration_since(f.last_seen_close) >= self.config.recovery {
            debug!("Object back in range, off trigger re-armed");
            f.off_sent = false;
            // The same backoff as a failed send, so a re-armed trigger
            // cannot immediately thrash the device.
            f.next_retry_at = Some(now + self.config.retry_backoff);
        }
    }

    /// Whether an off command has been confirmed and not yet recovered.
    pub fn off_sent(&self) -> bool {
        self.lock().off_sent
    }

    fn lock(&self) -> MutexGuard<'_, Fields> {
        self.fields.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S> std::fmt::Debug for PulseMachine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PulseMachine")
            .field("config", &self.config)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
