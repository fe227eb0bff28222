//! Persistence-side collaborators consumed by the driver.

use async_trait::async_trait;
use erpsync_core::{Entity, EntityId, SourceError};

/// Lists the entities currently due for synchronization.
#[async_trait]
pub trait PendingEntityLister: Send + Sync {
    /// Return every entity whose data should be synchronized now.
    ///
    /// Fails on connectivity or query errors; the driver treats a failure as
    /// a skipped poll tick.
    async fn list_pending(&self) -> Result<Vec<Entity>, SourceError>;
}

/// Persists the "last synced" watermark for an entity.
#[async_trait]
pub trait CompletionRecorder: Send + Sync {
    async fn record_completion(&self, entity_id: EntityId) -> Result<(), SourceError>;
}
