//! Types for the staging module.

use serde::{Deserialize, Serialize};

/// Role of a staged file within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagedPurpose {
    /// Downloaded source media.
    Input,
    /// Transcoded audio.
    Output,
}

impl StagedPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Allocation ledger of a staging area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingStats {
    /// Files allocated since startup.
    pub allocated: u64,
    /// Files released since startup.
    pub released: u64,
    /// Files allocated and not yet released.
    pub active: u64,
}
