//! Deduplicated FIFO of entities awaiting synchronization.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use erpsync_core::{Entity, EntityId};
use serde::Serialize;

/// An entity waiting in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub entity: Entity,
    pub enqueued_at: DateTime<Utc>,
}

/// FIFO queue holding at most one entry per entity id.
///
/// Not synchronized; the driver keeps it behind a mutex.
#[derive(Debug, Default)]
pub struct SyncQueue {
    entries: VecDeque<QueueEntry>,
}

impl SyncQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entity` unless an entry with the same id is already queued.
    /// Returns whether it was inserted.
    pub fn enqueue_if_absent(&mut self, entity: Entity) -> bool {
        if self.contains(entity.id) {
            return false;
        }
        self.entries.push_back(QueueEntry {
            entity,
            enqueued_at: Utc::now(),
        });
        true
    }

    /// Remove and return the head entry.
    pub fn dequeue(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        // Linear scan; queues hold tens of entities.
        self.entries.iter().any(|e| e.entity.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ordered copy of the queued entries.
    pub fn snapshot(&self) -> Vec<QueueEntry> {
        self.entries.iter().cloned().collect()
    }
}
