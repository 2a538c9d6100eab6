//! The conversion pipeline: resolve, download, transcode, read, clean up.
//!
//! One [`ConversionPipeline::run`] drives a single request through every
//! stage, publishing progress through a [`ProgressReporter`](crate::progress::ProgressReporter)
//! and releasing both staged files before it returns.

mod error;
mod runner;
mod sanitize;
mod types;

pub use error::ConversionError;
pub use runner::ConversionPipeline;
pub use sanitize::{sanitize_title, suggested_filename};
pub use types::{ConversionRequest, ConversionResult};
