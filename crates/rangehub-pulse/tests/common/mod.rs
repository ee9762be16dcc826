//! Shared test fixtures for the pulse crate.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use rangehub_core::DeviceState;
use rangehub_network::CommandSender;
use rangehub_protocol::Command;
use rangehub_pulse::{PulseConfig, PulseMachine};

/// Scripted command transport: records every send and answers success or
/// failure from a queue (defaulting to success once the queue is empty).
pub struct FakeSender {
    outcomes: Mutex<VecDeque<bool>>,
    sent: Mutex<Vec<(String, IpAddr)>>,
}

impl FakeSender {
    pub fn succeeding() -> Self {
        Self::with_outcomes([])
    }

    pub fn with_outcomes(outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Every command sent so far, in order, with its target address.
    pub fn sent(&self) -> Vec<(String, IpAddr)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl CommandSender for FakeSender {
    async fn send(&self, command: Command, addr: IpAddr) -> bool {
        self.sent
            .lock()
            .unwrap()
            .push((command.as_str().to_string(), addr));
        self.outcomes.lock().unwrap().pop_front().unwrap_or(true)
    }
}

pub struct Fixture {
    pub state: Arc<DeviceState>,
    pub sender: Arc<FakeSender>,
    pub machine: Arc<PulseMachine<FakeSender>>,
}

pub fn fixture(sender: FakeSender) -> Fixture {
    let state = Arc::new(DeviceState::new());
    let sender = Arc::new(sender);
    let machine = Arc::new(PulseMachine::new(
        PulseConfig::default(),
        Arc::clone(&state),
        Arc::clone(&sender),
    ));
    Fixture {
        state,
        sender,
        machine,
    }
}
