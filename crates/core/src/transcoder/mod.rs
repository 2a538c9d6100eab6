//! Transcoder module for turning downloaded media into MP3.
//!
//! This module provides the `Transcoder` trait and an FFmpeg-backed
//! implementation. The pipeline only ever asks for one thing: an audio-only
//! encode of a staged input file into a staged output file, with progress
//! reported on a channel.
//!
//! # Example
//!
//! ```ignore
//! use tunegrab_core::transcoder::{FfmpegTranscoder, Transcoder, TranscodeJob, TranscodeSettings};
//!
//! let transcoder = FfmpegTranscoder::with_defaults();
//! transcoder.validate().await?;
//!
//! let job = TranscodeJob {
//!     job_id: "job-1".to_string(),
//!     input_path: PathBuf::from("/tmp/tunegrab/input.m4a"),
//!     output_path: PathBuf::from("/tmp/tunegrab/output.mp3"),
//!     settings: TranscodeSettings::default(),
//! };
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(16);
//! let outcome = transcoder.transcode(job, tx).await?;
//! println!("Transcoded in {} ms", outcome.duration_ms);
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::TranscoderConfig;
pub use error::TranscoderError;
pub use ffmpeg::FfmpegTranscoder;
pub use traits::Transcoder;
pub use types::{
    AudioFormat, MediaInfo, TranscodeJob, TranscodeOutcome, TranscodeProgress, TranscodeSettings,
};
