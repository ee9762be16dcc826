//! Shared device state.
//!
//! [`DeviceState`] is the single shared-ownership object holding everything
//! the bridge knows about the device: the most recently observed peer address
//! and the latest distance/alert snapshot. It is constructed once at startup
//! and passed by `Arc` to the telemetry server, the pulse machine, the
//! heartbeat driver, and the external status collaborator.
//!
//! All fields sit behind plain `std::sync` mutexes with assignment-only
//! critical sections; no I/O ever happens under a lock.

use std::net::IpAddr;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One distance observation from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistanceReading {
    /// Measured distance in millimeters.
    pub millimeters: i64,

    /// When the reading was processed by the bridge.
    pub observed_at: DateTime<Utc>,
}

/// Read-only snapshot of the device state for the status collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// Last measured distance in millimeters, if any reading has arrived.
    pub millimeters: Option<i64>,

    /// Timestamp of the last distance reading.
    pub updated_at: Option<DateTime<Utc>>,

    /// Last reported alert flag.
    pub alert: bool,
}

#[derive(Debug, Default)]
struct Telemetry {
    distance: Option<DistanceReading>,
    alert: bool,
}

/// Last-known device state shared across all bridge components.
///
/// The address slot is last-write-wins with no history: when several
/// connections race, whichever was accepted last supplies the address used
/// for outbound commands.
///
/// # Example
///
/// ```
/// use rangehub_core::DeviceState;
///
/// let state = DeviceState::new();
/// assert!(state.device_addr().is_none());
///
/// state.record_peer("10.0.0.7".parse().unwrap());
/// assert_eq!(state.device_addr(), Some("10.0.0.7".parse().unwrap()));
/// ```
#[derive(Debug, Default)]
pub struct DeviceState {
    addr: Mutex<Option<IpAddr>>,
    telemetry: Mutex<Telemetry>,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the peer address of a newly accepted device connection.
    pub fn record_peer(&self, addr: IpAddr) {
        *lock(&self.addr) = Some(addr);
    }

    /// The most recently observed device address, if any connection has
    /// ever been accepted.
    pub fn device_addr(&self) -> Option<IpAddr> {
        *lock(&self.addr)
    }

    /// Target address for outbound commands: the cached device address, or
    /// the configured fallback when no connection has ever been accepted.
    pub fn device_addr_or_fallback(&self) -> IpAddr {
        self.device_addr()
            .unwrap_or(crate::constants::FALLBACK_DEVICE_ADDR)
    }

    /// Overwrite the distance reading with a fresh observation.
    pub fn record_distance(&self, millimeters: i64, observed_at: DateTime<Utc>) {
        lock(&self.telemetry).distance = Some(DistanceReading {
            millimeters,
            observed_at,
        });
    }

    /// Overwrite the alert flag.
    pub fn record_alert(&self, active: bool) {
        lock(&self.telemetry).alert = active;
    }

    /// The latest distance reading, if any.
    pub fn distance(&self) -> Option<DistanceReading> {
        lock(&self.telemetry).distance
    }

    /// The latest alert flag.
    pub fn alert(&self) -> bool {
        lock(&self.telemetry).alert
    }

    /// Consistent snapshot for the external status endpoint.
    pub fn snapshot(&self) -> StatusSnapshot {
        let t = lock(&self.telemetry);
        StatusSnapshot {
            millimeters: t.distance.map(|d| d.millimeters),
            updated_at: t.distance.map(|d| d.observed_at),
            alert: t.alert,
        }
    }
}

/// Lock helper that survives poisoning. The guarded sections are plain field
/// assignments, so state behind a poisoned lock is still coherent.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_slot_is_last_write_wins() {
        let state = DeviceState::new();
        state.record_peer("10.0.0.1".parse().unwrap());
        state.record_peer("10.0.0.2".parse().unwrap());
        assert_eq!(state.device_addr(), Some("10.0.0.2".parse().unwrap()));
    }

    #[test]
    fn distance_is_overwritten_per_reading() {
        let state = DeviceState::new();
        let t0 = Utc::now();
        state.record_distance(1500, t0);
        state.record_distance(3000, t0);

        let reading = state.distance().unwrap();
        assert_eq!(reading.millimeters, 3000);
        assert_eq!(reading.observed_at, t0);
    }

    #[test]
    fn alert_flag_overwrites() {
        let state = DeviceState::new();
        assert!(!state.alert());
        state.record_alert(true);
        assert!(state.alert());
        state.record_alert(false);
        assert!(!state.alert());
    }

    #[test]
    fn snapshot_is_empty_before_any_reading() {
        let state = DeviceState::new();
        let snap = state.snapshot();
        assert_eq!(snap.millimeters, None);
        assert_eq!(snap.updated_at, None);
        assert!(!snap.alert);
    }

    #[test]
    fn snapshot_serializes_for_status_endpoint() {
        let state = DeviceState::new();
        state.record_distance(1234, Utc::now());
        state.record_alert(true);

        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["millimeters"], 1234);
        assert_eq!(json["alert"], true);
        assert!(json["updated_at"].is_string());
    }
}
