//! Outbound TCP client for device commands.
//!
//! The [`CommandClient`] owns the single outbound connection to the device
//! and serializes every send through one async mutex — the single-flight
//! gate. At most one send is in flight process-wide, so two command payloads
//! can never interleave bytes on the wire, regardless of whether the caller
//! is the heartbeat, the pulse machine, or the external command relay.
//!
//! # Connection lifecycle
//!
//! The connection is established lazily on the first send and deliberately
//! kept open across calls for reuse. Any failure during connect or write
//! tears the session down, so the next call re-establishes from scratch.
//! A connect that exceeds the configured timeout counts as a send failure.
//!
//! # Error contract
//!
//! Nothing escapes [`CommandClient::send_to`] as an error: the caller gets a
//! plain success boolean, and the underlying transport error is emitted as a
//! `tracing` warning so failures stay observable.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::codec::Framed;
use tracing::{debug, trace, warn};

use rangehub_core::Error;
use rangehub_core::constants::{COMMAND_PORT, CONNECT_TIMEOUT_MS};
use rangehub_protocol::{Command, LineCodec};

use crate::traits::CommandSender;

/// Configuration for the outbound command client.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use rangehub_network::CommandClientConfig;
///
/// let config = CommandClientConfig {
///     device_port: 1234,
///     connect_timeout: Duration::from_millis(1000),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CommandClientConfig {
    /// Port on the device that accepts commands.
    pub device_port: u16,

    /// Bound on connection establishment; exceeding it fails the send.
    pub connect_timeout: Duration,
}

impl Default for CommandClientConfig {
    fn default() -> Self {
        Self {
            device_port: COMMAND_PORT,
            connect_timeout: Duration::from_millis(CONNECT_TIMEOUT_MS),
        }
    }
}

/// Reusable single-connection command client.
///
/// Share it with `Arc`; the internal mutex is the serialization gate, so
/// callers never need their own locking.
#[derive(Debug)]
pub struct CommandClient {
    config: CommandClientConfig,

    /// The one outbound session. `None` until the first send, and again
    /// after any failure. Guarded by the single-flight gate.
    session: Mutex<Option<Framed<TcpStream, LineCodec>>>,
}

impl CommandClient {
    pub fn new(config: CommandClientConfig) -> Self {
        debug!(
            port = config.device_port,
            timeout_ms = config.connect_timeout.as_millis() as u64,
            "Creating command client"
        );

        Self {
            config,
            session: Mutex::new(None),
        }
    }

    /// Send one command to the device at `addr`, returning whether the
    /// write was flushed successfully.
    ///
    /// Holds the single-flight gate for the whole connect-write-flush
    /// sequence. On failure the session is discarded and `false` returned;
    /// the error itself is logged, never propagated.
    pub async fn send_to(&self, command: Command, addr: IpAddr) -> bool {
        let mut session = self.session.lock().await;

        match self.write_command(&mut session, &command, addr).await {
            Ok(()) => {
                trace!(command = %command, addr = %addr, "Command sent");
                true
            }
            Err(e) => {
                warn!(command = %command, addr = %addr, error = %e, "Command send failed");
                // Broken session is torn down before any new one is attempted.
                *session = None;
                false
            }
        }
    }

    async fn write_command(
        &self,
        session: &mut Option<Framed<TcpStream, LineCodec>>,
        command: &Command,
        addr: IpAddr,
    ) -> Result<(), Error> {
        if session.is_none() {
            *session = Some(self.connect(addr).await?);
        }

        if let Some(framed) = session.as_mut() {
            framed.send(command.clone()).await?;
        }

        Ok(())
    }

    async fn connect(&self, addr: IpAddr) -> Result<Framed<TcpStream, LineCodec>, Error> {
        let target = SocketAddr::new(addr, self.config.device_port);
        debug!(target = %target, "Establishing outbound command connection");

        let stream =
            match tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(target))
                .await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    return Err(Error::ConnectTimeout(
                        self.config.connect_timeout.as_millis() as u64,
                    ));
                }
            };

        // Commands are single short lines; never let Nagle hold them back.
        if let Err(e) = stream.set_nodelay(true) {
            warn!(target = %target, error = %e, "Failed to set TCP_NODELAY");
        }

        Ok(Framed::new(stream, LineCodec::new()))
    }
}

impl CommandSender for CommandClient {
    async fn send(&self, command: Command, addr: IpAddr) -> bool {
        self.send_to(command, addr).await
    }
}
