//! Recurring sync scheduler.
//!
//! A [`QueueDriver`] polls a [`PendingEntityLister`] on a fixed interval,
//! enqueues newly pending entities into a deduplicated [`SyncQueue`], and
//! drains the queue one entity at a time through a [`SyncPipeline`] of ten
//! ordered [`SubSynchronizer`] stages. Stage failures are contained per stage,
//! entity failures per entity, and poll failures per tick.

pub mod driver;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod source;
pub mod types;

pub use driver::QueueDriver;
pub use error::{ConfigError, DriverError, PipelineError};
pub use metrics::DriverMetrics;
pub use pipeline::{FnSynchronizer, SubSynchronizer, SyncPipeline, SyncPipelineBuilder, SyncStage};
pub use queue::{QueueEntry, SyncQueue};
pub use source::{CompletionRecorder, PendingEntityLister};
pub use types::{DriverConfig, DriverStatus, PipelineStageResult, PollOutcome, StageOutcome};

pub use erpsync_core::{Entity, EntityId, SourceError, SyncError};
