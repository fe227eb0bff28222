use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::metrics::DriverMetrics;
use crate::pipeline::SyncPipeline;
use crate::queue::SyncQueue;
use crate::source::{CompletionRecorder, PendingEntityLister};
use crate::types::{DriverConfig, DriverStatus, PollOutcome};

/// Explicitly owned sync scheduler. Cloning yields another handle to the
/// same driver.
#[derive(Clone)]
pub struct QueueDriver {
    pub(super) inner: Arc<DriverInner>,
}

pub(super) struct DriverInner {
    pub(super) config: DriverConfig,
    pub(super) lister: Arc<dyn PendingEntityLister>,
    pub(super) recorder: Arc<dyn CompletionRecorder>,
    pub(super) pipeline: Arc<SyncPipeline>,
    /// Shared between the timer task (enqueue) and the drain task (dequeue).
    /// Never held across an await.
    pub(super) queue: Mutex<SyncQueue>,
    /// Single-flight drain flag.
    pub(super) draining: AtomicBool,
    pub(super) metrics: RwLock<DriverMetrics>,
    /// Polling timer task; `Some` while running.
    pub(super) timer: Mutex<Option<JoinHandle<()>>>,
}

impl DriverInner {
    pub(super) fn lock_queue(&self) -> MutexGuard<'_, SyncQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn update_metrics(&self, f: impl FnOnce(&mut DriverMetrics)) {
        let mut metrics = self.metrics.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut metrics);
    }

    fn lock_timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueueDriver {
    pub fn new(
        config: DriverConfig,
        lister: Arc<dyn PendingEntityLister>,
        recorder: Arc<dyn CompletionRecorder>,
        pipeline: SyncPipeline,
    ) -> Self {
        Self {
            inner: Arc::new(DriverInner {
                config,
                lister,
                recorder,
                pipeline: Arc::new(pipeline),
                queue: Mutex::new(SyncQueue::new()),
                draining: AtomicBool::new(false),
                metrics: RwLock::new(DriverMetrics::default()),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Arm the polling timer and, if configured, poll once right away.
    ///
    /// No-op (with a warning) when already running. Must be called from
    /// within a Tokio runtime.
    pub fn start(&self) {
        let mut timer = self.inner.lock_timer();
        if timer.is_some() {
            warn!("Sync queue driver already running");
            return;
        }

        let period = self.inner.config.poll_interval();
        info!(poll_interval_secs = period.as_secs(), "Starting sync queue driver");

        // The timer holds a weak handle so dropping every QueueDriver ends it.
        let weak: Weak<DriverInner> = Arc::downgrade(&self.inner);
        *timer = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                inner.poll_isolated().await;
            }
        }));

        if self.inner.config.poll_on_start {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(inner.poll_isolated());
        }
    }

    /// Cancel the polling timer. An in-flight drain keeps running.
    pub fn stop(&self) {
        if let Some(handle) = self.inner.lock_timer().take() {
            handle.abort();
            info!("Sync queue driver stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock_timer().is_some()
    }

    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Acquire)
    }

    /// Poll the lister now, outside the timer. Spawns a drain if needed.
    pub async fn poll_now(&self) -> PollOutcome {
        self.inner.poll_and_enqueue().await
    }

    /// Drain the queue on the caller's task. Returns the number of entities
    /// taken off the queue, or 0 if another drain is already active.
    pub async fn drain(&self) -> usize {
        self.inner.drain().await
    }

    pub fn status(&self) -> DriverStatus {
        let is_running = self.is_running();
        let queue = self.inner.lock_queue();
        DriverStatus {
            queue_length: queue.len(),
            is_draining: self.is_draining(),
            is_running,
            queued_entities: queue.snapshot(),
            captured_at: Utc::now(),
        }
    }

    /// Get a snapshot of the current driver metrics.
    pub fn metrics(&self) -> DriverMetrics {
        self.inner
            .metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn config(&self) -> &DriverConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for QueueDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueDriver")
            .field("config", &self.inner.config)
            .field("running", &self.is_running())
            .field("draining", &self.is_draining())
            .field("queue_length", &self.inner.lock_queue().len())
            .finish()
    }
}
