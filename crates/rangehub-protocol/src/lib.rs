//! Wire protocol for the rangehub telemetry bridge.
//!
//! Both directions speak plain ASCII lines terminated by a single LF. This
//! crate provides the two halves of that protocol:
//!
//! - [`TelemetryLine`]: the inbound line grammar (`distance:<mm>`,
//!   `alert:<0|1>`), parsed best-effort — anything unrecognized is simply
//!   not a telemetry line, never an error.
//! - [`LineCodec`]: a Tokio codec that extracts LF-delimited lines from a
//!   TCP stream and encodes outbound [`Command`]s with their terminator.
//!
//! # Example
//!
//! ```
//! use rangehub_protocol::TelemetryLine;
//!
//! assert_eq!(TelemetryLine::parse("distance: 1500"), Some(TelemetryLine::Distance(1500)));
//! assert_eq!(TelemetryLine::parse("ALERT:1"), Some(TelemetryLine::Alert(true)));
//! assert_eq!(TelemetryLine::parse("hello"), None);
//! ```

pub mod codec;
pub mod line;

pub use codec::{Command, LineCodec};
pub use line::TelemetryLine;
