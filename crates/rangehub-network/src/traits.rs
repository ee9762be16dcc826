//! Trait seams between the network layer and the decision logic.
//!
//! Edition 2024 native async-in-trait (RPITIT) is used instead of the
//! `async-trait` crate; the explicit `impl Future + Send` return types let
//! implementors be used from spawned tasks.

use std::future::Future;
use std::net::IpAddr;

use rangehub_protocol::Command;

/// Consumer of inbound telemetry lines.
///
/// The telemetry server calls this synchronously per non-blank line, in
/// arrival order within one connection. Implementations must never fail:
/// the inbound protocol is best-effort and unrecognized input is dropped.
pub trait LineHandler: Send + Sync {
    fn handle_line(&self, line: &str) -> impl Future<Output = ()> + Send;
}

/// Outbound command channel.
///
/// Returns `true` only when the command was written and flushed to the
/// device. All transport failures collapse to `false`; diagnostics are the
/// implementation's responsibility.
pub trait CommandSender: Send + Sync {
    fn send(&self, command: Command, addr: IpAddr) -> impl Future<Output = bool> + Send;
}
