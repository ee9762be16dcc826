//! Heartbeat cadence tests on a paused clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use common::{FakeSender, fixture};
use rangehub_pulse::{HeartbeatConfig, HeartbeatDriver};

#[tokio::test(start_paused = true)]
async fn pings_every_third_tick_and_drives_the_machine() {
    let f = fixture(FakeSender::succeeding());
    f.machine.observe_distance(3000); // far, so the first tick sends OFF

    let driver = HeartbeatDriver::new(
        HeartbeatConfig::default(),
        Arc::clone(&f.state),
        Arc::clone(&f.sender),
        Arc::clone(&f.machine),
    );

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(driver.run(shutdown.clone()));

    // Paused clock auto-advances; 3.5 s covers ticks at 1 s, 2 s, and 3 s.
    tokio::time::sleep(Duration::from_millis(3500)).await;
    shutdown.cancel();
    handle.await.unwrap();

    let sent = f.sender.sent();
    let pings = sent.iter().filter(|(cmd, _)| cmd == "PING").count();
    let offs = sent.iter().filter(|(cmd, _)| cmd == "OFF").count();

    // One PING at the third tick, one OFF from the first machine tick
    // (far reading was already past the grace window).
    assert_eq!(pings, 1);
    assert_eq!(offs, 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_heartbeat_stops_ticking() {
    let f = fixture(FakeSender::succeeding());

    let driver = HeartbeatDriver::new(
        HeartbeatConfig::default(),
        Arc::clone(&f.state),
        Arc::clone(&f.sender),
        Arc::clone(&f.machine),
    );

    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let handle = tokio::spawn(driver.run(shutdown));
    handle.await.unwrap();

    assert_eq!(f.sender.sent_count(), 0);
}
