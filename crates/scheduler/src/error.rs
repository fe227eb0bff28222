use erpsync_core::{EntityId, SourceError, SyncError};

use crate::pipeline::SyncStage;

/// Failures observed by the driver. None of these stop the driver; they are
/// logged at the boundary where they occur.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to list pending entities: {0}")]
    ListPending(#[source] SourceError),

    #[error("stage {stage} failed for entity {entity_id}: {source}")]
    Stage {
        stage: SyncStage,
        entity_id: EntityId,
        #[source]
        source: SyncError,
    },

    #[error("failed to record completion for entity {entity_id}: {source}")]
    RecordCompletion {
        entity_id: EntityId,
        #[source]
        source: SourceError,
    },

    #[error("stage {stage} panicked for entity {entity_id}: {message}")]
    StagePanicked {
        stage: SyncStage,
        entity_id: EntityId,
        message: String,
    },

    #[error("sync task panicked for entity {entity_id}: {message}")]
    EntityPanicked { entity_id: EntityId, message: String },

    #[error("poll tick panicked: {0}")]
    PollPanicked(String),
}

/// Error building a [`SyncPipeline`](crate::SyncPipeline).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no synchronizer registered for stage {0}")]
    MissingStage(SyncStage),
    #[error("stage {0} registered more than once")]
    DuplicateStage(SyncStage),
}

/// Error loading a [`DriverConfig`](crate::DriverConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid driver config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("poll interval must be at least one second")]
    ZeroInterval,
}
