//! Keep-alive liveness monitor
//!
//! Detects a transport that went quiet without closing. Each call to
//! [`LivenessMonitor::reset`] records activity and restarts the keep-alive
//! interval. When the interval expires the monitor either sends a heartbeat
//! probe (activity was seen) or reports a ping timeout to the connection
//! controller (nothing was seen since its own probe). Detection therefore
//! takes at most two intervals.
//!
//! # Examples
//! ```no_run
//! use mqtt_runtime::protocol::WireEncoder;
//! use mqtt_runtime::testing::{MockController, MockTimerService};
//! use mqtt_runtime::transport::LivenessMonitor;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let timers = Arc::new(MockTimerService::new());
//! let controller = Arc::new(MockController::new());
//! let monitor = LivenessMonitor::new(60, &WireEncoder, timers.clone(), &controller);
//!
//! monitor.reset();
//! timers.advance(Duration::from_secs(60));
//! assert_eq!(controller.probe_count(), 1);
//! ```

use super::timer::{TimerHandle, TimerService};
use super::{lock_unpoisoned, ConnectionController};
use crate::error::ClientError;
use crate::protocol::ProtocolEncoder;
use bytes::Bytes;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tracing::{debug, error, warn};

const COMPONENT: &str = "LivenessMonitor";

/// Observable phase of the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No callback pending
    Idle,
    /// Callback pending and activity recorded since it was scheduled
    Armed,
    /// Probe sent; waiting one more interval for activity
    AwaitingProbe,
}

struct Inner {
    armed: bool,
    pending: Option<TimerHandle>,
    // Bumped on every schedule and cancel; callbacks from older epochs are stale
    epoch: u64,
}

enum Decision {
    SendProbe,
    TimedOut,
}

struct Shared<T: ?Sized, C: ?Sized> {
    interval: Duration,
    probe: Bytes,
    timer: Arc<T>,
    controller: Weak<C>,
    inner: Mutex<Inner>,
}

/// Per-connection keep-alive monitor
///
/// Holds only a weak reference to its controller, so the controller may own
/// the monitor. Dropping the monitor cancels it.
pub struct LivenessMonitor<T, C>
where
    T: TimerService + ?Sized + 'static,
    C: ConnectionController + ?Sized + 'static,
{
    shared: Arc<Shared<T, C>>,
}

impl<T, C> LivenessMonitor<T, C>
where
    T: TimerService + ?Sized + 'static,
    C: ConnectionController + ?Sized + 'static,
{
    /// Create a monitor for a keep-alive interval given in seconds
    ///
    /// An interval of zero disables the monitor: `reset` then only records
    /// activity and nothing is ever scheduled.
    pub fn new(
        keep_alive_secs: u64,
        encoder: &dyn ProtocolEncoder,
        timer: Arc<T>,
        controller: &Arc<C>,
    ) -> Self {
        Self::with_interval(
            Duration::from_secs(keep_alive_secs),
            encoder,
            timer,
            controller,
        )
    }

    pub fn with_interval(
        interval: Duration,
        encoder: &dyn ProtocolEncoder,
        timer: Arc<T>,
        controller: &Arc<C>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                interval,
                probe: encoder.encode_heartbeat_probe(),
                timer,
                controller: Arc::downgrade(controller),
                inner: Mutex::new(Inner {
                    armed: false,
                    pending: None,
                    epoch: 0,
                }),
            }),
        }
    }

    /// Record outbound activity and restart the keep-alive interval
    pub fn reset(&self) {
        let mut inner = lock_unpoisoned(&self.shared.inner);
        inner.armed = true;
        self.shared.cancel_pending(&mut inner);
        if self.is_enabled() {
            Shared::schedule(&self.shared, &mut inner);
        }
    }

    /// Stop the monitor; no callback starts after this returns
    pub fn cancel(&self) {
        let mut inner = lock_unpoisoned(&self.shared.inner);
        self.shared.cancel_pending(&mut inner);
    }

    pub fn state(&self) -> MonitorState {
        let inner = lock_unpoisoned(&self.shared.inner);
        match (inner.pending.is_some(), inner.armed) {
            (false, _) => MonitorState::Idle,
            (true, true) => MonitorState::Armed,
            (true, false) => MonitorState::AwaitingProbe,
        }
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn is_enabled(&self) -> bool {
        !self.shared.interval.is_zero()
    }
}

impl<T, C> Shared<T, C>
where
    T: TimerService + ?Sized + 'static,
    C: ConnectionController + ?Sized + 'static,
{
    fn cancel_pending(&self, inner: &mut Inner) {
        inner.epoch = inner.epoch.wrapping_add(1);
        if let Some(handle) = inner.pending.take() {
            self.timer.cancel(handle);
        }
    }

    fn schedule(shared: &Arc<Self>, inner: &mut Inner) {
        inner.epoch = inner.epoch.wrapping_add(1);
        let epoch = inner.epoch;
        let weak = Arc::downgrade(shared);
        let handle = shared.timer.schedule(
            shared.interval,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    Shared::on_timer(&shared, epoch);
                }
            }),
        );
        inner.pending = Some(handle);
    }

    fn on_timer(shared: &Arc<Self>, epoch: u64) {
        let _span =
            crate::liveness_span!(interval_ms = shared.interval.as_millis() as u64).entered();

        let decision = {
            let mut inner = lock_unpoisoned(&shared.inner);
            if inner.epoch != epoch {
                debug!("Discarding superseded keep-alive timer");
                return;
            }
            inner.pending = None;

            if inner.armed {
                inner.armed = false;
                Shared::schedule(shared, &mut inner);
                Decision::SendProbe
            } else {
                inner.epoch = inner.epoch.wrapping_add(1);
                Decision::TimedOut
            }
        };

        // Collaborators are called without the lock so they may re-enter reset()
        let Some(controller) = shared.controller.upgrade() else {
            debug!("Connection controller dropped; ignoring keep-alive timer");
            return;
        };

        match decision {
            Decision::SendProbe => {
                controller.trace(COMPONENT, "send PINGREQ");
                debug!("Sending keep-alive probe");
                if let Err(e) = controller.transmit(shared.probe.clone()) {
                    warn!(error = %e, "Failed to transmit keep-alive probe");
                }
            }
            Decision::TimedOut => {
                let timeout = ClientError::PingTimeout;
                controller.trace(COMPONENT, "Timed out");
                error!(
                    code = timeout.code(),
                    "Keep-alive timed out; connection is dead"
                );
                controller.report_fatal(timeout.code(), &timeout.to_string());
            }
        }
    }
}

impl<T, C> Drop for LivenessMonitor<T, C>
where
    T: TimerService + ?Sized + 'static,
    C: ConnectionController + ?Sized + 'static,
{
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<T, C> fmt::Debug for LivenessMonitor<T, C>
where
    T: TimerService + ?Sized + 'static,
    C: ConnectionController + ?Sized + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivenessMonitor")
            .field("interval", &self.shared.interval)
            .field("state", &self.state())
            .finish()
    }
}
