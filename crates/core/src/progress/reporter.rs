//! Per-run progress writer.

use std::sync::Arc;
use tracing::{trace, warn};

use super::store::ProgressStore;
use super::types::{ProgressPhase, ProgressSnapshot};

pub const MSG_RESOLVING: &str = "Resolving...";
pub const MSG_DOWNLOADING: &str = "Downloading...";
pub const MSG_CONVERTING: &str = "Converting...";
pub const MSG_COMPLETE: &str = "Complete!";
pub const MSG_FAILED: &str = "Failed";

/// Job context for one conversion run.
///
/// The reporter is the only writer of the store while its run is active. It
/// never moves the phase backwards and never publishes a percent above 100.
/// Dropping a reporter whose run started but never reached a terminal phase
/// (a panic or a cancelled future) publishes `Failed`.
#[derive(Debug)]
pub struct ProgressReporter {
    store: Arc<ProgressStore>,
    job_id: String,
    phase: ProgressPhase,
    percent: u8,
}

impl ProgressReporter {
    pub fn new(store: Arc<ProgressStore>, job_id: impl Into<String>) -> Self {
        Self {
            store,
            job_id: job_id.into(),
            phase: ProgressPhase::Idle,
            percent: 0,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Phase most recently published by this run.
    pub fn phase(&self) -> ProgressPhase {
        self.phase
    }

    /// Percent most recently published by this run.
    pub fn last_percent(&self) -> u8 {
        self.percent
    }

    pub fn resolving(&mut self) {
        self.publish(ProgressPhase::Resolving, 0, MSG_RESOLVING);
    }

    pub fn downloading(&mut self, percent: u8) {
        self.publish(ProgressPhase::Downloading, percent, MSG_DOWNLOADING);
    }

    pub fn transcoding(&mut self, percent: u8) {
        self.publish(ProgressPhase::Transcoding, percent, MSG_CONVERTING);
    }

    pub fn complete(&mut self) {
        self.publish(ProgressPhase::Complete, 100, MSG_COMPLETE);
    }

    /// Marks the run failed, keeping the last known percent.
    pub fn failed(&mut self) {
        let percent = self.percent;
        self.publish(ProgressPhase::Failed, percent, MSG_FAILED);
    }

    fn publish(&mut self, phase: ProgressPhase, percent: u8, message: &str) {
        if self.phase.is_terminal() || phase.rank() < self.phase.rank() {
            warn!(
                job_id = %self.job_id,
                from = %self.phase,
                to = %phase,
                "Ignoring out-of-order progress update"
            );
            return;
        }

        let percent = percent.min(100);
        if phase == self.phase && percent == self.percent {
            return;
        }

        trace!(job_id = %self.job_id, %phase, percent, "Progress");
        self.phase = phase;
        self.percent = percent;
        self.store.set(ProgressSnapshot::new(
            phase,
            percent,
            message,
            Some(self.job_id.clone()),
        ));
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if self.phase == ProgressPhase::Idle || self.phase.is_terminal() {
            return;
        }
        warn!(
            job_id = %self.job_id,
            phase = %self.phase,
            "Run ended without a terminal state, marking failed"
        );
        self.failed();
    }
}
