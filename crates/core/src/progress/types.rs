//! Types for the progress module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of the active conversion.
///
/// Variants are declared in the order a run moves through them, so the
/// derived `Ord` matches the lifecycle (`Complete` and `Failed` are both
/// terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    Idle,
    Resolving,
    Downloading,
    Transcoding,
    Complete,
    Failed,
}

impl ProgressPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Downloading => "downloading",
            Self::Transcoding => "transcoding",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    /// Rank used for ordering checks; both terminal phases share a rank.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Resolving => 1,
            Self::Downloading => 2,
            Self::Transcoding => 3,
            Self::Complete | Self::Failed => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl std::fmt::Display for ProgressPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The latest progress record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Percent complete within the current phase (0-100).
    pub percent: u8,
    pub phase: ProgressPhase,
    /// Human-readable status line.
    pub message: String,
    /// Run that wrote this snapshot (`None` while idle).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressSnapshot {
    /// Creates a snapshot, clamping `percent` to 100.
    pub fn new(
        phase: ProgressPhase,
        percent: u8,
        message: impl Into<String>,
        job_id: Option<String>,
    ) -> Self {
        Self {
            percent: percent.min(100),
            phase,
            message: message.into(),
            job_id,
            updated_at: Utc::now(),
        }
    }

    /// The process start value.
    pub fn idle() -> Self {
        Self::new(ProgressPhase::Idle, 0, "", None)
    }
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_snapshot() {
        let snapshot = ProgressSnapshot::idle();
        assert_eq!(snapshot.phase, ProgressPhase::Idle);
        assert_eq!(snapshot.percent, 0);
        assert_eq!(snapshot.message, "");
        assert!(snapshot.job_id.is_none());
    }

    #[test]
    fn test_percent_is_clamped() {
        let snapshot = ProgressSnapshot::new(ProgressPhase::Downloading, 250, "x", None);
        assert_eq!(snapshot.percent, 100);
    }

    #[test]
    fn test_phase_order_follows_lifecycle() {
        assert!(ProgressPhase::Idle < ProgressPhase::Resolving);
        assert!(ProgressPhase::Resolving < ProgressPhase::Downloading);
        assert!(ProgressPhase::Downloading < ProgressPhase::Transcoding);
        assert!(ProgressPhase::Transcoding < ProgressPhase::Complete);
        assert_eq!(ProgressPhase::Complete.rank(), ProgressPhase::Failed.rank());
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot =
            ProgressSnapshot::new(ProgressPhase::Transcoding, 42, "Converting...", Some("j".into()));
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"phase\":\"transcoding\""));
        assert!(json.contains("\"percent\":42"));
        assert!(json.contains("\"job_id\":\"j\""));
    }
}
