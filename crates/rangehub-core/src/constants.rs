//! Protocol and timing constants for the rangehub bridge.
//!
//! Both wire protocols are plain ASCII lines terminated by a single LF:
//!
//! ```text
//! inbound  (device -> bridge, port 4321):  distance:<mm>  |  alert:<0|1>
//! outbound (bridge -> device, port 1234):  PING  |  OFF  |  <operator command>
//! ```
//!
//! The timing constants drive the pulse state machine: an `OFF` is sent only
//! after a sustained over-threshold ("far") reading, re-armed only after a
//! sustained under-threshold ("close") reading, with a fixed backoff after a
//! failed or re-armed attempt.

use std::net::{IpAddr, Ipv4Addr};

// ============================================================================
// Ports and addresses
// ============================================================================

/// Port the telemetry server listens on for device connections.
pub const TELEMETRY_PORT: u16 = 4321;

/// Port on the device that accepts outbound commands.
pub const COMMAND_PORT: u16 = 1234;

/// Address used for outbound commands before any device has connected.
pub const FALLBACK_DEVICE_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 10, 223));

// ============================================================================
// Distance threshold
// ============================================================================

/// Distance at or below which the object counts as "close", in millimeters.
///
/// The original deployment documented this as "30 cm" but shipped 2000 mm.
/// The shipped constant is the observed behavior, so it is kept as-is; the
/// mismatched description is a documentation defect, not a code one.
pub const DISTANCE_THRESHOLD_MM: i64 = 2000;

// ============================================================================
// Pulse timing (milliseconds)
// ============================================================================

/// How long a "far" reading must be sustained before an OFF is attempted.
pub const FAR_GRACE_MS: u64 = 500;

/// How long a "close" reading must be sustained, after a successful OFF,
/// before the off trigger is re-armed.
pub const CLOSE_RECOVERY_MS: u64 = 1000;

/// Backoff after a failed OFF attempt (and after recovery re-arms the
/// trigger) before another attempt is permitted.
pub const RETRY_BACKOFF_MS: u64 = 5000;

// ============================================================================
// Outbound client
// ============================================================================

/// Connect timeout for the outbound command connection (milliseconds).
///
/// A timeout is reported to the caller as a plain send failure.
pub const CONNECT_TIMEOUT_MS: u64 = 1000;

// ============================================================================
// Heartbeat
// ============================================================================

/// Heartbeat tick period (milliseconds). Every tick drives the pulse machine.
pub const HEARTBEAT_INTERVAL_MS: u64 = 1000;

/// A PING is sent every this many heartbeat ticks (~3 s at 1 Hz).
pub const PING_EVERY_TICKS: u32 = 3;

// ============================================================================
// Command vocabulary
// ============================================================================

/// Liveness probe; the result is discarded.
pub const CMD_PING: &str = "PING";

/// Commands the device off after sustained far readings.
pub const CMD_OFF: &str = "OFF";

// ============================================================================
// Line limits
// ============================================================================

/// Maximum accepted inbound line length in bytes.
///
/// Legitimate telemetry lines are under 32 bytes; the limit only bounds
/// memory growth when a peer streams garbage without a line terminator.
pub const MAX_LINE_LENGTH: usize = 256;
