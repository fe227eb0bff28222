use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::error::DriverError;
use crate::queue::QueueEntry;

use super::core::DriverInner;

/// Holds the single-flight drain flag; clears it on drop, including when the
/// drain future is cancelled.
struct DrainFlag<'a>(&'a AtomicBool);

impl<'a> DrainFlag<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrainFlag(flag))
    }
}

impl Drop for DrainFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DriverInner {
    /// Process queued entities one at a time until the queue is empty.
    pub(super) async fn drain(&self) -> usize {
        let Some(mut flag) = DrainFlag::acquire(&self.draining) else {
            debug!("Drain already in progress");
            return 0;
        };

        let mut processed = 0;
        loop {
            let next = {
                let mut queue = self.lock_queue();
                let entry = queue.dequeue();
                let remaining = queue.len();
                entry.map(|entry| (entry, remaining))
            };

            let Some((entry, remaining)) = next else {
                drop(flag);
                // A poll may have enqueued after the empty dequeue while still
                // seeing the flag set; reclaim the drain rather than strand it.
                if self.lock_queue().is_empty() {
                    break;
                }
                match DrainFlag::acquire(&self.draining) {
                    Some(reclaimed) => {
                        flag = reclaimed;
                        continue;
                    }
                    None => break,
                }
            };

            processed += 1;
            self.process_entry(entry, remaining).await;
        }

        self.update_metrics(|m| m.record_drain_completed());
        info!(processed, "Sync queue drained");
        processed
    }

    async fn process_entry(&self, entry: QueueEntry, remaining: usize) {
        let entity = entry.entity;
        info!(entity_id = entity.id, entity = %entity.name, remaining, "Processing sync");

        let pipeline = Arc::clone(&self.pipeline);
        let recorder = Arc::clone(&self.recorder);
        let task_entity = entity.clone();
        // Pipeline and watermark run on their own task so a panic in either
        // surfaces here as a JoinError instead of unwinding the drain.
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let results = pipeline.run(&task_entity).await;
            let elapsed = start.elapsed();
            // Recorded even when stages failed: the watermark always advances.
            let recorded = recorder.record_completion(task_entity.id).await;
            (results, elapsed, recorded)
        });

        let (results, elapsed, recorded) = match handle.await {
            Ok(report) => report,
            Err(join_err) => {
                let err = DriverError::EntityPanicked {
                    entity_id: entity.id,
                    message: join_err.to_string(),
                };
                error!(entity = %entity.name, "{}", err);
                self.update_metrics(|m| m.record_entity_panic());
                return;
            }
        };
        self.update_metrics(|m| m.record_pipeline(&results, elapsed));

        match recorded {
            Ok(()) => {
                let failed = results.iter().filter(|r| !r.is_success()).count();
                info!(
                    entity_id = entity.id,
                    entity = %entity.name,
                    failed_stages = failed,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Sync completed"
                );
            }
            Err(source) => {
                let err = DriverError::RecordCompletion {
                    entity_id: entity.id,
                    source,
                };
                error!(entity = %entity.name, "{}", err);
                self.update_metrics(|m| m.record_completion_failure());
            }
        }
    }
}
