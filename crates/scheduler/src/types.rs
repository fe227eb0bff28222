use std::time::Duration;

use chrono::{DateTime, Utc};
use erpsync_core::config::SyncSettings;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pipeline::SyncStage;
use crate::queue::QueueEntry;

/// Driver configuration, typically built from env or parsed from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Seconds between pending-entity polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Run one poll right away on start instead of waiting a full interval.
    #[serde(default = "default_poll_on_start")]
    pub poll_on_start: bool,
}

fn default_poll_interval() -> u64 { 60 }
fn default_poll_on_start() -> bool { true }

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            poll_on_start: default_poll_on_start(),
        }
    }
}

impl DriverConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: DriverConfig = toml::from_str(s)?;
        if config.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl From<&SyncSettings> for DriverConfig {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            poll_interval_secs: settings.poll_interval_secs,
            poll_on_start: settings.poll_on_start,
        }
    }
}

/// Outcome of one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageOutcome {
    Success,
    Failure,
}

/// Result of running one stage for one entity. Informational only.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStageResult {
    pub stage: SyncStage,
    pub outcome: StageOutcome,
    /// Rendered error for failed stages.
    pub error: Option<String>,
    /// The stage panicked rather than returning an error.
    pub panicked: bool,
    pub duration: Duration,
}

impl PipelineStageResult {
    pub fn is_success(&self) -> bool {
        self.outcome == StageOutcome::Success
    }
}

/// What a single poll did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollOutcome {
    /// Entities returned by the lister.
    pub listed: usize,
    /// Entities newly added to the queue.
    pub enqueued: usize,
    /// Whether this poll spawned a drain task. The task exits without
    /// dequeuing if another drain claims the flag first, so this means
    /// "drain requested", not "entities will be processed by this task".
    pub drain_started: bool,
}

/// Snapshot of driver state for status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct DriverStatus {
    pub queue_length: usize,
    pub is_draining: bool,
    pub is_running: bool,
    pub queued_entities: Vec<QueueEntry>,
    pub captured_at: DateTime<Utc>,
}
