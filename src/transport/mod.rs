//! Transport-facing collaborators of the client runtime
//!
//! The connection controller owns the socket and the connection lifecycle.
//! This module defines the narrow surface the runtime needs from it, plus
//! the timer abstraction and the keep-alive [`pinger::LivenessMonitor`].

use crate::error::ClientResult;
use bytes::Bytes;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod pinger;
pub mod timer;

pub use pinger::{LivenessMonitor, MonitorState};
pub use timer::{TimerCallback, TimerHandle, TimerService, TokioTimerService};

/// Capabilities the connection controller exposes to runtime components
///
/// Implementations are owned by the connection and must not block: every
/// method is invoked from timer callbacks.
pub trait ConnectionController: Send + Sync {
    /// Write raw protocol bytes to the transport
    fn transmit(&self, bytes: Bytes) -> ClientResult<()>;

    /// Report a failure that ends the connection
    fn report_fatal(&self, code: u16, message: &str);

    /// Diagnostic trace hook
    fn trace(&self, component: &str, event: &str) {
        tracing::trace!(component, event, "connection trace");
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
