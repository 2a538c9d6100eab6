//! Mock transcoder for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::transcoder::{
    MediaInfo, TranscodeJob, TranscodeOutcome, TranscodeProgress, Transcoder, TranscoderError,
};

/// A recorded transcode job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTranscode {
    /// The job that was submitted.
    pub job: TranscodeJob,
    /// Size of the input file when the job started, if it existed.
    pub input_size: Option<u64>,
    /// Whether the transcode succeeded.
    pub success: bool,
}

/// Mock implementation of the Transcoder trait.
///
/// By default it writes a small fake MP3 to the job's output path and
/// reports 25/50/75/100 percent. Failures can write partial output first,
/// and `skip_output` makes it claim success without writing anything.
#[derive(Debug)]
pub struct MockTranscoder {
    transcodes: Arc<RwLock<Vec<RecordedTranscode>>>,
    /// Bytes written to the output path.
    output: Arc<RwLock<Vec<u8>>>,
    /// Percent values sent before finishing.
    progress_steps: Arc<RwLock<Vec<Option<f32>>>>,
    /// Delay after each progress step.
    step_delay_ms: Arc<RwLock<u64>>,
    /// If set, the next transcode fails with this error.
    next_error: Arc<RwLock<Option<TranscoderError>>>,
    /// Write half of the output before failing.
    partial_output: Arc<RwLock<bool>>,
    /// Report success without writing the output.
    skip_output: Arc<RwLock<bool>>,
    /// Panic after reporting progress.
    panic: Arc<RwLock<bool>>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder.
    pub fn new() -> Self {
        let mut output = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
        output.extend(std::iter::repeat_n(0xff, 512));

        Self {
            transcodes: Arc::new(RwLock::new(Vec::new())),
            output: Arc::new(RwLock::new(output)),
            progress_steps: Arc::new(RwLock::new(vec![
                Some(25.0),
                Some(50.0),
                Some(75.0),
                Some(100.0),
            ])),
            step_delay_ms: Arc::new(RwLock::new(0)),
            next_error: Arc::new(RwLock::new(None)),
            partial_output: Arc::new(RwLock::new(false)),
            skip_output: Arc::new(RwLock::new(false)),
            panic: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded transcodes.
    pub async fn recorded_transcodes(&self) -> Vec<RecordedTranscode> {
        self.transcodes.read().await.clone()
    }

    /// Get the number of transcodes attempted.
    pub async fn transcode_count(&self) -> usize {
        self.transcodes.read().await.len()
    }

    /// Set the bytes written as output.
    pub async fn set_output(&self, output: Vec<u8>) {
        *self.output.write().await = output;
    }

    /// Set the percent values reported during a transcode.
    pub async fn set_progress_steps(&self, steps: Vec<Option<f32>>) {
        *self.progress_steps.write().await = steps;
    }

    /// Sleep between progress steps.
    pub async fn set_step_delay(&self, delay: Duration) {
        *self.step_delay_ms.write().await = delay.as_millis() as u64;
    }

    /// Configure the next transcode to fail with the given error.
    ///
    /// Progress steps are still reported before the failure.
    pub async fn set_next_error(&self, error: TranscoderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Write half of the output before a configured failure.
    pub async fn set_partial_output(&self, partial: bool) {
        *self.partial_output.write().await = partial;
    }

    /// Report success without writing any output.
    pub async fn set_skip_output(&self, skip: bool) {
        *self.skip_output.write().await = skip;
    }

    /// Panic mid-transcode, after progress steps are reported.
    pub async fn set_panic(&self, panic: bool) {
        *self.panic.write().await = panic;
    }

    async fn record(&self, job: TranscodeJob, input_size: Option<u64>, success: bool) {
        self.transcodes.write().await.push(RecordedTranscode {
            job,
            input_size,
            success,
        });
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscoderError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| TranscoderError::InputNotFound {
                path: path.to_path_buf(),
            })?;

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            duration_secs: 180.0,
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
            audio_codec: Some("opus".to_string()),
            audio_bitrate_kbps: Some(160),
            audio_sample_rate: Some(48000),
            audio_channels: Some(2),
        })
    }

    async fn transcode(
        &self,
        job: TranscodeJob,
        progress_tx: mpsc::Sender<TranscodeProgress>,
    ) -> Result<TranscodeOutcome, TranscoderError> {
        let input_size = tokio::fs::metadata(&job.input_path)
            .await
            .ok()
            .map(|m| m.len());

        let steps = self.progress_steps.read().await.clone();
        let delay_ms = *self.step_delay_ms.read().await;
        for (i, percent) in steps.iter().enumerate() {
            let _ = progress_tx
                .send(TranscodeProgress {
                    job_id: job.job_id.clone(),
                    percent: *percent,
                    time_secs: (i + 1) as f64 * 45.0,
                    duration_secs: percent.map(|_| 180.0),
                    speed: Some("20x".to_string()),
                })
                .await;
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }

        let should_panic = *self.panic.read().await;
        if should_panic {
            panic!("mock transcoder panicked on job {}", job.job_id);
        }

        let output = self.output.read().await.clone();

        if let Some(err) = self.next_error.write().await.take() {
            if *self.partial_output.read().await {
                tokio::fs::write(&job.output_path, &output[..output.len() / 2]).await?;
            }
            self.record(job, input_size, false).await;
            return Err(err);
        }

        if !*self.skip_output.read().await {
            tokio::fs::write(&job.output_path, &output).await?;
        }
        self.record(job.clone(), input_size, true).await;

        Ok(TranscodeOutcome {
            job_id: job.job_id,
            output_path: job.output_path,
            duration_ms: delay_ms * steps.len() as u64,
            input_format: job
                .input_path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_string),
        })
    }

    async fn validate(&self) -> Result<(), TranscoderError> {
        Ok(())
    }
}
