//! Cancellable one-shot timers
//!
//! [`TimerService`] is the only scheduling facility runtime components use;
//! nothing reaches for an ambient clock. [`TokioTimerService`] backs it with
//! spawned tokio tasks.

use super::lock_unpoisoned;
use crate::error::{ClientError, ClientResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

/// Work run once when a timer expires
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Identifies one scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Schedules callbacks after a delay
pub trait TimerService: Send + Sync {
    /// Run `callback` once after `delay`
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

    /// Prevent a scheduled callback from running
    ///
    /// Unknown, fired and already cancelled handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}

type TaskTable = Arc<Mutex<HashMap<u64, JoinHandle<()>>>>;

/// Timer service running each callback on its own tokio task
pub struct TokioTimerService {
    runtime: Handle,
    next_id: AtomicU64,
    tasks: TaskTable,
}

impl TokioTimerService {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Bind to the runtime of the calling context
    pub fn try_current() -> ClientResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| ClientError::invalid_state("no tokio runtime available"))
    }

    /// Number of callbacks scheduled and not yet fired or cancelled
    pub fn pending(&self) -> usize {
        lock_unpoisoned(&self.tasks).len()
    }
}

impl TimerService for TokioTimerService {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = Arc::clone(&self.tasks);

        // Held across spawn so the task cannot look itself up before it is registered
        let mut table = lock_unpoisoned(&self.tasks);
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let still_scheduled = lock_unpoisoned(&tasks).remove(&id).is_some();
            if still_scheduled {
                callback();
            }
        });
        table.insert(id, task);

        trace!(timer_id = id, delay_ms = delay.as_millis() as u64, "Timer scheduled");
        TimerHandle::new(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(task) = lock_unpoisoned(&self.tasks).remove(&handle.id()) {
            task.abort();
            trace!(timer_id = handle.id(), "Timer cancelled");
        }
    }
}

impl Drop for TokioTimerService {
    fn drop(&mut self) {
        for (_, task) in lock_unpoisoned(&self.tasks).drain() {
            task.abort();
        }
    }
}
