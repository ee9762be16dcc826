//! Decision logic for the rangehub telemetry bridge.
//!
//! Three pieces sit between the inbound and outbound network layers:
//!
//! - [`TelemetryProcessor`]: parses recognized telemetry lines, updates the
//!   shared [`DeviceState`] and feeds distance observations to the machine.
//! - [`PulseMachine`]: the debounced off/recovery state machine, driven once
//!   per heartbeat tick.
//! - [`HeartbeatDriver`]: the 1 Hz loop that pings the device every third
//!   tick and drives the machine every tick.
//!
//! [`DeviceState`]: rangehub_core::DeviceState

pub mod heartbeat;
pub mod machine;
pub mod processor;

pub use heartbeat::{HeartbeatConfig, HeartbeatDriver};
pub use machine::{PulseConfig, PulseMachine};
pub use processor::TelemetryProcessor;
