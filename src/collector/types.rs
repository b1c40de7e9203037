use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CollectorError;
use crate::metrics::{MetricRecord, PublishOutcome};

/// Host to poll, as returned by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub id: String,
    pub address: String,
    pub display_name: String,
}

/// Pipeline position of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    Idle,
    WalkingMemory,
    WalkingDisk,
    Deriving,
    Publishing,
    Done,
    Failed,
}

/// Everything that happened to one target during a pass.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: Target,
    pub state: TargetState,
    /// Step that was running when the target failed.
    pub failed_during: Option<TargetState>,
    pub failure: Option<CollectorError>,
    pub memory: Vec<MetricRecord>,
    pub disk: Vec<MetricRecord>,
    /// Per-metric or per-row derivation problems; siblings were still derived.
    pub derivation_errors: Vec<CollectorError>,
    pub publish: Vec<PublishOutcome>,
    pub timestamp: DateTime<Utc>,
}

impl TargetReport {
    pub fn new(target: Target, timestamp: DateTime<Utc>) -> Self {
        Self {
            target,
            state: TargetState::Idle,
            failed_during: None,
            failure: None,
            memory: Vec::new(),
            disk: Vec::new(),
            derivation_errors: Vec::new(),
            publish: Vec::new(),
            timestamp,
        }
    }

    pub fn advance(&mut self, state: TargetState) {
        tracing::debug!(target_id = %self.target.id, from = ?self.state, to = ?state, "target state");
        self.state = state;
    }

    pub fn fail(mut self, error: CollectorError) -> Self {
        tracing::warn!(
            target_id = %self.target.id,
            address = %self.target.address,
            step = ?self.state,
            error = %error,
            "target failed"
        );
        self.failed_during = Some(self.state);
        self.state = TargetState::Failed;
        self.failure = Some(error);
        self
    }

    pub fn is_done(&self) -> bool {
        self.state == TargetState::Done
    }
}

/// Result of one collection pass.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub started_at: DateTime<Utc>,
    pub targets: Vec<TargetReport>,
    /// Outcomes of the last target that reached publishing.
    pub last_publish: Vec<PublishOutcome>,
}

impl CollectionReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            targets: Vec::new(),
            last_publish: Vec::new(),
        }
    }

    pub fn merge(&mut self, report: TargetReport) {
        if !report.publish.is_empty() {
            self.last_publish = report.publish.clone();
        }
        self.targets.push(report);
    }
}
