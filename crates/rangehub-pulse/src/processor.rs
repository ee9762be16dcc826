//! Inbound line processing.
//!
//! [`TelemetryProcessor`] is the [`LineHandler`] the telemetry server feeds.
//! It is stateless itself: recognized lines update the shared
//! [`DeviceState`] and, for distance readings, the pulse machine's close/far
//! timestamps. Everything else is dropped without a sound — the telemetry
//! protocol is best-effort and a malformed line is never an error.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, trace};

use rangehub_core::DeviceState;
use rangehub_network::{CommandSender, LineHandler};
use rangehub_protocol::TelemetryLine;

use crate::machine::PulseMachine;

/// Parses telemetry lines and routes their effects.
pub struct TelemetryProcessor<S> {
    state: Arc<DeviceState>,
    machine: Arc<PulseMachine<S>>,
}

impl<S: CommandSender> TelemetryProcessor<S> {
    pub fn new(state: Arc<DeviceState>, machine: Arc<PulseMachine<S>>) -> Self {
        Self { state, machine }
    }
}

impl<S: CommandSender> LineHandler for TelemetryProcessor<S> {
    async fn handle_line(&self, line: &str) {
        match TelemetryLine::parse(line) {
            Some(TelemetryLine::Distance(mm)) => {
                debug!(millimeters = mm, "Distance reading");
                self.state.record_distance(mm, Utc::now());
                self.machine.observe_distance(mm);
            }
            Some(TelemetryLine::Alert(active)) => {
                debug!(active, "Alert flag");
                self.state.record_alert(active);
            }
            None => {
                trace!(line, "Unrecognized telemetry line dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::PulseConfig;
    use std::net::IpAddr;
    use rangehub_protocol::Command;

    /// Sender that records nothing and always succeeds; these tests only
    /// exercise state updates, never sends.
    struct NullSender;

    impl CommandSender for NullSender {
        async fn send(&self, _command: Command, _addr: IpAddr) -> bool {
            true
        }
    }

    fn processor() -> (Arc<DeviceState>, TelemetryProcessor<NullSender>) {
        let state = Arc::new(DeviceState::new());
        let machine = Arc::new(PulseMachine::new(
            PulseConfig::default(),
            Arc::clone(&state),
            Arc::new(NullSender),
        ));
        (Arc::clone(&state), TelemetryProcessor::new(state, machine))
    }

    #[tokio::test]
    async fn distance_line_updates_reading() {
        let (state, proc) = processor();
        proc.handle_line("distance:1500").await;

        assert_eq!(state.distance().unwrap().millimeters, 1500);
    }

    #[tokio::test]
    async fn alert_lines_toggle_flag() {
        let (state, proc) = processor();

        proc.handle_line("alert:1").await;
        assert!(state.alert());

        proc.handle_line("alert:0").await;
        assert!(!state.alert());

        proc.handle_line("alert:2").await;
        assert!(!state.alert());
    }

    #[tokio::test]
    async fn unrecognized_lines_leave_state_unchanged() {
        let (state, proc) = processor();
        proc.handle_line("distance:abc").await;
        proc.handle_line("temperature:20").await;
        proc.handle_line("PING").await;

        assert!(state.distance().is_none());
        assert!(!state.alert());
    }
}
