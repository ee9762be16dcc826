//! Inbound TCP server for device telemetry.
//!
//! The [`TelemetryServer`] accepts line-oriented ASCII connections from the
//! device. Accepting a connection immediately records the peer's IP address
//! into the shared [`DeviceState`] (last-write-wins, so concurrent
//! connections overwrite each other) and spawns an independent session task.
//! Sessions are deliberately unbounded and never joined, matching the
//! original deployment's fan-out behavior.
//!
//! # Session behavior
//!
//! Each session reads LF-delimited lines until end-of-stream, an I/O error,
//! or shutdown. Blank and whitespace-only lines are discarded. Every other
//! line is handed synchronously to the [`LineHandler`] before the next read,
//! so processing within one connection is strictly in arrival order. There
//! is no ordering guarantee across connections.
//!
//! Session I/O errors are logged and end that session only; they never
//! propagate and never affect other sessions or the shared state.
//!
//! # Shutdown
//!
//! Both the accept loop and every session observe the same
//! [`CancellationToken`] and exit promptly when it fires. Cancelling does
//! not force-close in-flight line handling.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use rangehub_core::constants::TELEMETRY_PORT;
use rangehub_core::{DeviceState, Error, Result};
use rangehub_protocol::LineCodec;

use crate::traits::LineHandler;

/// Configuration for the telemetry server.
///
/// # Example
///
/// ```
/// use rangehub_network::TelemetryServerConfig;
///
/// let config = TelemetryServerConfig {
///     bind_addr: "0.0.0.0:4321".parse().unwrap(),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct TelemetryServerConfig {
    /// Address to bind; all interfaces on the telemetry port by default.
    /// Address reuse is enabled by the listener implementation.
    pub bind_addr: SocketAddr,
}

impl Default for TelemetryServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], TELEMETRY_PORT)),
        }
    }
}

/// Line-oriented telemetry server (ASCII + LF).
///
/// Learns the device's address as soon as it connects.
pub struct TelemetryServer {
    listener: tokio::net::TcpListener,
    config: TelemetryServerConfig,
}

impl TelemetryServer {
    /// Bind the server to the configured address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BindFailed`] when the address is in use or
    /// binding is not permitted.
    pub async fn bind(config: TelemetryServerConfig) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| Error::BindFailed {
                addr: config.bind_addr,
                source,
            })?;

        info!("Telemetry server listening on {}", config.bind_addr);

        Ok(Self { listener, config })
    }

    /// The actual bound address; useful when binding to port 0 in tests.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(Into::into)
    }

    /// Accept connections until the token is cancelled.
    ///
    /// Each accepted connection updates the device address slot and runs as
    /// its own task. When the token fires, the loop stops accepting;
    /// running sessions observe the same token and wind down on their own.
    pub async fn run<H>(self, state: Arc<DeviceState>, handler: Arc<H>, shutdown: CancellationToken)
    where
        H: LineHandler + 'static,
    {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Telemetry server shutting down");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            // Learn and cache the device's address (last-wins).
                            state.record_peer(peer.ip());
                            info!(peer = %peer, "Device connected");

                            let handler = Arc::clone(&handler);
                            let shutdown = shutdown.clone();
                            tokio::spawn(run_session(stream, peer, handler, shutdown));
                        }
                        Err(e) => {
                            warn!(error = %e, "Accept failed");
                        }
                    }
                }
            }
        }

        drop(self.listener);
        debug!("Listener on {} closed", self.config.bind_addr);
    }
}

/// One connection's read loop: lines in arrival order, blanks discarded,
/// errors logged and terminal for this session only.
async fn run_session<H>(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<H>,
    shutdown: CancellationToken,
) where
    H: LineHandler,
{
    if let Err(e) = stream.set_nodelay(true) {
        warn!(peer = %peer, error = %e, "Failed to set TCP_NODELAY");
    }
    // Close immediately on session end, no pending-send drain.
    if let Err(e) = stream.set_linger(Some(Duration::ZERO)) {
        warn!(peer = %peer, error = %e, "Failed to set SO_LINGER");
    }

    let mut framed = Framed::new(stream, LineCodec::new());

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(peer = %peer, "Session cancelled");
                break;
            }
            next = framed.next() => {
                match next {
                    Some(Ok(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        handler.handle_line(&line).await;
                    }
                    Some(Err(e)) => {
                        warn!(peer = %peer, error = %e, "Session I/O error");
                        break;
                    }
                    None => {
                        debug!(peer = %peer, "Device closed connection");
                        break;
                    }
                }
            }
        }
    }

    info!(peer = %peer, "Session closed");
}
