//! Network layer for the rangehub telemetry bridge.
//!
//! This crate provides the two TCP endpoints of the bridge:
//!
//! - **[`TelemetryServer`]**: accepts line-oriented telemetry connections
//!   from the device, records the peer address into [`DeviceState`], and
//!   runs one session task per connection.
//! - **[`CommandClient`]**: maintains one reusable outbound connection to
//!   the device and sends single ASCII commands through a process-wide
//!   single-flight gate.
//!
//! The seams between layers are two small traits: [`LineHandler`] (what the
//! server feeds inbound lines to) and [`CommandSender`] (what the pulse
//! machine and heartbeat send commands through), so the decision logic can
//! be tested against fakes without sockets.
//!
//! [`DeviceState`]: rangehub_core::DeviceState
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rangehub_core::DeviceState;
//! use rangehub_network::{CommandClient, CommandClientConfig, CommandSender};
//! use rangehub_protocol::Command;
//!
//! # async fn example() {
//! let state = Arc::new(DeviceState::new());
//! let client = CommandClient::new(CommandClientConfig::default());
//!
//! let ok = client.send(Command::ping(), state.device_addr_or_fallback()).await;
//! println!("ping delivered: {ok}");
//! # }
//! ```

mod client;
mod server;
mod traits;

pub use client::{CommandClient, CommandClientConfig};
pub use server::{TelemetryServer, TelemetryServerConfig};
pub use traits::{CommandSender, LineHandler};
