//! Scratch-file management for conversion runs.
//!
//! Every run stages exactly two files: the downloaded source media
//! ([`StagedPurpose::Input`]) and the transcoded audio
//! ([`StagedPurpose::Output`]). Paths are unique per allocation and nothing
//! touches the disk until a writer opens the path.
//!
//! A [`StagedFile`] is a guard: it is deleted when released explicitly or,
//! failing that, when dropped. Deletion errors are logged, never returned.

mod area;
mod config;
mod types;

pub use area::{StagedFile, StagingArea};
pub use config::StagingConfig;
pub use types::{StagedPurpose, StagingStats};
