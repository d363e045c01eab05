//! Mock implementations for testing
//!
//! Provides a virtual-clock timer service and a recording connection
//! controller so keep-alive behavior can be tested deterministically.

use crate::error::{ClientError, ClientResult};
use crate::protocol::{ProtocolEncoder, WireEncoder};
use crate::transport::{
    lock_unpoisoned, ConnectionController, TimerCallback, TimerHandle, TimerService,
};
use bytes::Bytes;
use std::sync::Mutex;
use std::time::Duration;

struct ScheduledCallback {
    id: u64,
    deadline: Duration,
    callback: TimerCallback,
}

#[derive(Default)]
struct VirtualClock {
    now: Duration,
    next_id: u64,
    scheduled_total: usize,
    pending: Vec<ScheduledCallback>,
}

/// Timer service driven by an explicit virtual clock
///
/// Nothing fires until [`MockTimerService::advance`] moves the clock past a
/// deadline. Callbacks run in deadline order, outside the internal lock, so
/// they may schedule or cancel further timers.
#[derive(Default)]
pub struct MockTimerService {
    clock: Mutex<VirtualClock>,
}

impl MockTimerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        lock_unpoisoned(&self.clock).now
    }

    /// Move the clock forward, firing every callback that falls due
    pub fn advance(&self, by: Duration) {
        let target = lock_unpoisoned(&self.clock).now.saturating_add(by);
        loop {
            let due = {
                let mut clock = lock_unpoisoned(&self.clock);
                let next = clock
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.deadline <= target)
                    .min_by_key(|(_, entry)| (entry.deadline, entry.id))
                    .map(|(index, _)| index);

                match next {
                    Some(index) => {
                        let entry = clock.pending.remove(index);
                        clock.now = entry.deadline;
                        Some(entry.callback)
                    }
                    None => {
                        clock.now = target;
                        None
                    }
                }
            };

            match due {
                Some(callback) => callback(),
                None => break,
            }
        }
    }

    /// Callbacks scheduled and not yet fired or cancelled
    pub fn pending_count(&self) -> usize {
        lock_unpoisoned(&self.clock).pending.len()
    }

    /// Total number of `schedule` calls
    pub fn scheduled_count(&self) -> usize {
        lock_unpoisoned(&self.clock).scheduled_total
    }
}

impl TimerService for MockTimerService {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let mut clock = lock_unpoisoned(&self.clock);
        clock.next_id += 1;
        clock.scheduled_total += 1;
        let id = clock.next_id;
        let deadline = clock.now.saturating_add(delay);
        clock.pending.push(ScheduledCallback {
            id,
            deadline,
            callback,
        });
        TimerHandle::new(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        lock_unpoisoned(&self.clock)
            .pending
            .retain(|entry| entry.id != handle.id());
    }
}

/// Connection controller that records everything it is asked to do
#[derive(Debug, Default)]
pub struct MockController {
    pub transmitted: Mutex<Vec<Bytes>>,
    pub fatal_reports: Mutex<Vec<(u16, String)>>,
    pub traces: Mutex<Vec<(String, String)>>,
    pub should_fail: bool,
}

impl MockController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller whose transport rejects every transmission
    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn transmitted(&self) -> Vec<Bytes> {
        lock_unpoisoned(&self.transmitted).clone()
    }

    pub fn transmit_count(&self) -> usize {
        lock_unpoisoned(&self.transmitted).len()
    }

    /// Number of transmitted PINGREQ frames
    pub fn probe_count(&self) -> usize {
        let probe = WireEncoder.encode_heartbeat_probe();
        lock_unpoisoned(&self.transmitted)
            .iter()
            .filter(|frame| **frame == probe)
            .count()
    }

    pub fn fatal_reports(&self) -> Vec<(u16, String)> {
        lock_unpoisoned(&self.fatal_reports).clone()
    }

    pub fn traces(&self) -> Vec<(String, String)> {
        lock_unpoisoned(&self.traces).clone()
    }

    pub fn clear_history(&self) {
        lock_unpoisoned(&self.transmitted).clear();
        lock_unpoisoned(&self.fatal_reports).clear();
        lock_unpoisoned(&self.traces).clear();
    }
}

impl ConnectionController for MockController {
    fn transmit(&self, bytes: Bytes) -> ClientResult<()> {
        if self.should_fail {
            return Err(ClientError::transport("Mock transmit failure"));
        }
        lock_unpoisoned(&self.transmitted).push(bytes);
        Ok(())
    }

    fn report_fatal(&self, code: u16, message: &str) {
        lock_unpoisoned(&self.fatal_reports).push((code, message.to_string()));
    }

    fn trace(&self, component: &str, event: &str) {
        lock_unpoisoned(&self.traces).push((component.to_string(), event.to_string()));
    }
}
