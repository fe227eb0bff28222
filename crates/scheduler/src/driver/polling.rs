use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::DriverError;
use crate::types::PollOutcome;

use super::core::DriverInner;

impl DriverInner {
    /// Run one poll on its own task so a panicking lister cannot take down
    /// the caller (the ticker keeps firing).
    pub(super) async fn poll_isolated(self: Arc<Self>) {
        let inner = Arc::clone(&self);
        let tick = tokio::spawn(async move { inner.poll_and_enqueue().await });
        if let Err(join_err) = tick.await {
            let err = DriverError::PollPanicked(join_err.to_string());
            error!("{}", err);
            self.update_metrics(|m| m.record_poll_failure());
        }
    }

    /// List pending entities, enqueue the new ones, and kick off a drain if
    /// none is running. Never waits for the drain.
    pub(super) async fn poll_and_enqueue(self: &Arc<Self>) -> PollOutcome {
        let entities = match self.lister.list_pending().await {
            Ok(entities) => entities,
            Err(source) => {
                let err = DriverError::ListPending(source);
                error!("{}", err);
                self.update_metrics(|m| m.record_poll_failure());
                return PollOutcome::default();
            }
        };

        let listed = entities.len();
        if listed == 0 {
            debug!("No entities pending sync");
        } else {
            info!(count = listed, "Entities found pending sync");
        }

        let (enqueued, queue_nonempty) = {
            let mut queue = self.lock_queue();
            let mut enqueued = 0;
            for entity in entities {
                let (id, name) = (entity.id, entity.name.clone());
                if queue.enqueue_if_absent(entity) {
                    enqueued += 1;
                    info!(entity_id = id, entity = %name, "Added to sync queue");
                }
            }
            (enqueued, !queue.is_empty())
        };
        self.update_metrics(|m| m.record_poll(enqueued));

        let drain_started = queue_nonempty && !self.draining.load(Ordering::Acquire);
        if drain_started {
            let inner = Arc::clone(self);
            tokio::spawn(async move {
                inner.drain().await;
            });
        }

        PollOutcome {
            listed,
            enqueued,
            drain_started,
        }
    }
}
