//! Trait definitions for the transcoder module.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use super::error::TranscoderError;
use super::types::{MediaInfo, TranscodeJob, TranscodeOutcome, TranscodeProgress};

/// A transcoder that encodes media files into audio.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Probes a media file to get its information.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscoderError>;

    /// Transcodes according to the job, reporting progress on `progress_tx`.
    ///
    /// The sender is dropped when this returns, which closes the channel.
    /// Updates are best effort: a full or closed channel never fails the job.
    async fn transcode(
        &self,
        job: TranscodeJob,
        progress_tx: mpsc::Sender<TranscodeProgress>,
    ) -> Result<TranscodeOutcome, TranscoderError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscoderError>;
}
