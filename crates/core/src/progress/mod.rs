//! Progress reporting for the active conversion.
//!
//! A single [`ProgressStore`] holds the latest [`ProgressSnapshot`] for the
//! whole process. Pollers read it at any time; the running conversion writes
//! it through a [`ProgressReporter`], which carries the job identity and the
//! last percent it published.

mod reporter;
mod store;
mod types;

pub use reporter::ProgressReporter;
pub use store::ProgressStore;
pub use types::{ProgressPhase, ProgressSnapshot};
