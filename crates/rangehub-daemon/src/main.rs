//! rangehub daemon: wires the telemetry server, pulse machine, and
//! heartbeat together and runs them until Ctrl-C.
//!
//! Configuration comes from the environment:
//!
//! - `RANGEHUB_BIND` — telemetry bind address (default `0.0.0.0:4321`)
//! - `RANGEHUB_DEVICE_PORT` — device command port (default `1234`)
//! - `RUST_LOG` — tracing filter (default `info`)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rangehub_core::DeviceState;
use rangehub_network::{CommandClient, CommandClientConfig, TelemetryServer, TelemetryServerConfig};
use rangehub_pulse::{
    HeartbeatConfig, HeartbeatDriver, PulseConfig, PulseMachine, TelemetryProcessor,
};

#[derive(Debug)]
struct DaemonConfig {
    bind_addr: SocketAddr,
    device_port: u16,
}

impl DaemonConfig {
    fn from_env() -> Result<Self> {
        let bind_addr = match std::env::var("RANGEHUB_BIND") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid RANGEHUB_BIND: {raw}"))?,
            Err(_) => TelemetryServerConfig::default().bind_addr,
        };

        let device_port = match std::env::var("RANGEHUB_DEVICE_PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid RANGEHUB_DEVICE_PORT: {raw}"))?,
            Err(_) => CommandClientConfig::default().device_port,
        };

        Ok(Self {
            bind_addr,
            device_port,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DaemonConfig::from_env()?;
    info!(?config, "Starting rangehub {}", rangehub_core::VERSION);

    let state = Arc::new(DeviceState::new());
    let client = Arc::new(CommandClient::new(CommandClientConfig {
        device_port: config.device_port,
        ..CommandClientConfig::default()
    }));

    let machine = Arc::new(PulseMachine::new(
        PulseConfig::default(),
        Arc::clone(&state),
        Arc::clone(&client),
    ));
    let processor = Arc::new(TelemetryProcessor::new(
        Arc::clone(&state),
        Arc::clone(&machine),
    ));

    let server = TelemetryServer::bind(TelemetryServerConfig {
        bind_addr: config.bind_addr,
    })
    .await?;

    let shutdown = CancellationToken::new();

    let server_task = tokio::spawn(server.run(
        Arc::clone(&state),
        processor,
        shutdown.clone(),
    ));
    let heartbeat = HeartbeatDriver::new(
        HeartbeatConfig::default(),
        Arc::clone(&state),
        Arc::clone(&client),
        Arc::clone(&machine),
    );
    let heartbeat_task = tokio::spawn(heartbeat.run(shutdown.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("Ctrl-C received, shutting down");
    shutdown.cancel();

    let _ = tokio::join!(server_task, heartbeat_task);
    info!("Shutdown complete");

    Ok(())
}
