use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::SyncStage;
use crate::types::PipelineStageResult;

/// Per-stage success/failure counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounters {
    pub succeeded: u64,
    pub failed: u64,
}

/// Driver operational metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DriverMetrics {
    /// Poll ticks that reached the lister.
    pub polls: u64,
    /// Poll ticks aborted because listing failed.
    pub poll_failures: u64,
    /// Entities newly added to the queue.
    pub entities_enqueued: u64,
    /// Entities whose pipeline ran to the end (with or without stage failures).
    pub entities_processed: u64,
    /// Entities whose sync task panicked outside a stage.
    pub entity_panics: u64,
    /// Stages that panicked (also counted as stage failures).
    pub stage_panics: u64,
    /// Completion watermarks that failed to persist.
    pub completion_failures: u64,
    /// Drain passes that ran to an empty queue.
    pub drains_completed: u64,
    pub stages: HashMap<SyncStage, StageCounters>,
    /// Rolling average wall time of one entity's full pipeline.
    pub avg_pipeline_duration: Duration,
    pub last_poll: Option<DateTime<Utc>>,
    pub last_drain_completed: Option<DateTime<Utc>>,
}

impl DriverMetrics {
    pub fn record_poll(&mut self, enqueued: usize) {
        self.polls += 1;
        self.entities_enqueued += enqueued as u64;
        self.last_poll = Some(Utc::now());
    }

    pub fn record_poll_failure(&mut self) {
        self.poll_failures += 1;
        self.last_poll = Some(Utc::now());
    }

    /// Record one entity pass through the pipeline.
    pub fn record_pipeline(&mut self, results: &[PipelineStageResult], duration: Duration) {
        self.entities_processed += 1;
        for result in results {
            let counters = self.stages.entry(result.stage).or_default();
            if result.is_success() {
                counters.succeeded += 1;
            } else {
                counters.failed += 1;
            }
            if result.panicked {
                self.stage_panics += 1;
            }
        }

        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        let count = self.entities_processed;
        self.avg_pipeline_duration = if count == 1 {
            duration
        } else {
            let prev_nanos = self.avg_pipeline_duration.as_nanos() as f64;
            let cur_nanos = duration.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / count as f64;
            Duration::from_nanos(avg_nanos as u64)
        };
    }

    pub fn record_entity_panic(&mut self) {
        self.entity_panics += 1;
    }

    pub fn record_completion_failure(&mut self) {
        self.completion_failures += 1;
    }

    pub fn record_drain_completed(&mut self) {
        self.drains_completed += 1;
        self.last_drain_completed = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StageOutcome;

    fn result(stage: SyncStage, outcome: StageOutcome) -> PipelineStageResult {
        PipelineStageResult {
            stage,
            outcome,
            error: None,
            panicked: false,
            duration: Duration::from_millis(1),
        }
    }

    #[test]
    fn counts_stage_outcomes() {
        let mut m = DriverMetrics::default();
        m.record_pipeline(
            &[
                result(SyncStage::Partners, StageOutcome::Success),
                result(SyncStage::Stock, StageOutcome::Failure),
            ],
            Duration::from_millis(100),
        );
        m.record_pipeline(
            &[result(SyncStage::Stock, StageOutcome::Success)],
            Duration::from_millis(200),
        );

        assert_eq!(m.entities_processed, 2);
        assert_eq!(m.stages[&SyncStage::Partners], StageCounters { succeeded: 1, failed: 0 });
        assert_eq!(m.stages[&SyncStage::Stock], StageCounters { succeeded: 1, failed: 1 });

        // Average of 100ms and 200ms = 150ms
        let avg = m.avg_pipeline_duration.as_millis();
        assert!((140..=160).contains(&avg), "expected ~150ms, got {}ms", avg);
    }

    #[test]
    fn poll_counters() {
        let mut m = DriverMetrics::default();
        m.record_poll(3);
        m.record_poll(0);
        m.record_poll_failure();

        assert_eq!(m.polls, 2);
        assert_eq!(m.entities_enqueued, 3);
        assert_eq!(m.poll_failures, 1);
        assert!(m.last_poll.is_some());
    }

    #[test]
    fn default_metrics() {
        let m = DriverMetrics::default();
        assert_eq!(m.entities_processed, 0);
        assert_eq!(m.avg_pipeline_duration, Duration::ZERO);
        assert!(m.stages.is_empty());
        assert!(m.last_drain_completed.is_none());
    }
}
