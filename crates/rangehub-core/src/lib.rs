//! Core types for the rangehub telemetry bridge.
//!
//! This crate holds everything shared between the network and pulse layers:
//! protocol constants, the common error type, and [`DeviceState`] — the
//! last-known snapshot of the remote sensor device (address, distance, alert).

pub mod constants;
pub mod error;
pub mod state;

pub use error::{Error, Result};
pub use state::{DeviceState, DistanceReading, StatusSnapshot};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
