//! Ordered per-entity synchronization pipeline.
//!
//! Every stage runs for every entity regardless of earlier failures; results
//! are reported per stage and never short-circuit the remaining stages.

mod stage;

pub use stage::{FnSynchronizer, SubSynchronizer, SyncStage};

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use erpsync_core::Entity;
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::error::{DriverError, PipelineError};
use crate::types::{PipelineStageResult, StageOutcome};

/// The ten stage synchronizers, in [`SyncStage::ALL`] order.
pub struct SyncPipeline {
    stages: Vec<(SyncStage, Arc<dyn SubSynchronizer>)>,
}

impl SyncPipeline {
    pub fn builder() -> SyncPipelineBuilder {
        SyncPipelineBuilder::default()
    }

    /// Stage names in execution order.
    pub fn stages(&self) -> Vec<SyncStage> {
        self.stages.iter().map(|(stage, _)| *stage).collect()
    }

    /// Run every stage for `entity` in order. Never fails; a stage that
    /// errors or panics is reported as a failure and the next stage runs.
    pub async fn run(&self, entity: &Entity) -> Vec<PipelineStageResult> {
        let mut results = Vec::with_capacity(self.stages.len());

        for (stage, synchronizer) in &self.stages {
            debug!(entity_id = entity.id, stage = %stage, "Syncing stage");
            let start = Instant::now();

            let outcome = AssertUnwindSafe(synchronizer.sync(entity.id))
                .catch_unwind()
                .await;
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(source)) => Some(DriverError::Stage {
                    stage: *stage,
                    entity_id: entity.id,
                    source,
                }),
                Err(payload) => Some(DriverError::StagePanicked {
                    stage: *stage,
                    entity_id: entity.id,
                    message: panic_message(payload.as_ref()),
                }),
            };

            let result = match failure {
                None => {
                    debug!(entity_id = entity.id, stage = %stage, "Stage synced");
                    PipelineStageResult {
                        stage: *stage,
                        outcome: StageOutcome::Success,
                        error: None,
                        panicked: false,
                        duration: start.elapsed(),
                    }
                }
                Some(err) => {
                    warn!(entity_id = entity.id, entity = %entity.name, stage = %stage, "{}", err);
                    PipelineStageResult {
                        stage: *stage,
                        outcome: StageOutcome::Failure,
                        panicked: matches!(err, DriverError::StagePanicked { .. }),
                        error: Some(err.to_string()),
                        duration: start.elapsed(),
                    }
                }
            };
            results.push(result);
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(
            entity_id = entity.id,
            entity = %entity.name,
            stages = results.len(),
            failed,
            "Pipeline finished"
        );
        results
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Collects one synchronizer per stage.
#[derive(Default)]
pub struct SyncPipelineBuilder {
    stages: Vec<(SyncStage, Arc<dyn SubSynchronizer>)>,
}

impl SyncPipelineBuilder {
    pub fn stage(mut self, stage: SyncStage, synchronizer: Arc<dyn SubSynchronizer>) -> Self {
        self.stages.push((stage, synchronizer));
        self
    }

    /// Validate that each stage appears exactly once and order them canonically.
    pub fn build(self) -> Result<SyncPipeline, PipelineError> {
        let mut by_stage: HashMap<SyncStage, Arc<dyn SubSynchronizer>> = HashMap::new();
        for (stage, synchronizer) in self.stages {
            if by_stage.insert(stage, synchronizer).is_some() {
                return Err(PipelineError::DuplicateStage(stage));
            }
        }

        let mut stages = Vec::with_capacity(SyncStage::ALL.len());
        for stage in SyncStage::ALL {
            let synchronizer = by_stage
                .remove(&stage)
                .ok_or(PipelineError::MissingStage(stage))?;
            stages.push((stage, synchronizer));
        }

        Ok(SyncPipeline { stages })
    }
}
