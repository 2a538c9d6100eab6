//! Conversion pipeline implementation.

use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::metrics::{CONVERSIONS_TOTAL, DOWNLOADED_BYTES, STAGE_DURATION};
use crate::progress::ProgressReporter;
use crate::resolver::{ResolvedSource, Resolver};
use crate::staging::{StagedFile, StagedPurpose, StagingArea};
use crate::transcoder::{TranscodeJob, TranscodeProgress, TranscodeSettings, Transcoder};

use super::error::ConversionError;
use super::sanitize::suggested_filename;
use super::types::{ConversionRequest, ConversionResult};

/// Buffered transcoder progress events between the engine and the reporter.
const PROGRESS_CHANNEL_CAPACITY: usize = 32;

/// Drives one request through resolve, download, transcode and read.
///
/// The pipeline owns no per-run state; everything about a run lives in the
/// [`ProgressReporter`] handed to [`run`](Self::run) and in the two staged
/// files it allocates.
pub struct ConversionPipeline {
    resolver: Arc<dyn Resolver>,
    transcoder: Arc<dyn Transcoder>,
    staging: StagingArea,
    settings: TranscodeSettings,
}

impl ConversionPipeline {
    /// Creates a pipeline producing 128 kbps stereo MP3 at 44.1 kHz.
    pub fn new(
        resolver: Arc<dyn Resolver>,
        transcoder: Arc<dyn Transcoder>,
        staging: StagingArea,
    ) -> Self {
        Self {
            resolver,
            transcoder,
            staging,
            settings: TranscodeSettings::default(),
        }
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }

    pub fn transcoder(&self) -> &Arc<dyn Transcoder> {
        &self.transcoder
    }

    /// Runs the request to a terminal state.
    ///
    /// Both staged files are released before this returns, whatever the
    /// outcome. The last snapshot published is `Complete` on success and
    /// `Failed` otherwise.
    pub async fn run(
        &self,
        request: &ConversionRequest,
        reporter: &mut ProgressReporter,
    ) -> Result<ConversionResult, ConversionError> {
        let start = Instant::now();
        info!(
            job_id = %reporter.job_id(),
            url = %request.source_url,
            "Starting conversion"
        );

        let result = self.execute(request, reporter).await;

        match &result {
            Ok(output) => {
                reporter.complete();
                CONVERSIONS_TOTAL.with_label_values(&["complete"]).inc();
                info!(
                    job_id = %reporter.job_id(),
                    filename = %output.suggested_filename,
                    bytes = output.audio_bytes.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Conversion complete"
                );
            }
            Err(e) => {
                reporter.failed();
                CONVERSIONS_TOTAL.with_label_values(&[e.category()]).inc();
                error!(
                    job_id = %reporter.job_id(),
                    category = e.category(),
                    error = %e,
                    "Conversion failed"
                );
            }
        }

        result
    }

    async fn execute(
        &self,
        request: &ConversionRequest,
        reporter: &mut ProgressReporter,
    ) -> Result<ConversionResult, ConversionError> {
        let source = self.resolve(&request.source_url, reporter).await?;
        let filename = suggested_filename(&source.title, self.settings.format);

        let input = self.staging.allocate(StagedPurpose::Input, &source.container);
        if let Err(e) = self.download(&source, &input, reporter).await {
            self.staging.release(input).await;
            return Err(e);
        }

        let output = self
            .staging
            .allocate(StagedPurpose::Output, self.settings.format.extension());
        let audio = self.transcode_and_read(&input, &output, reporter).await;

        self.staging.release(input).await;
        self.staging.release(output).await;

        audio.map(|audio_bytes| ConversionResult {
            audio_bytes,
            suggested_filename: filename,
        })
    }

    async fn resolve(
        &self,
        url: &str,
        reporter: &mut ProgressReporter,
    ) -> Result<ResolvedSource, ConversionError> {
        reporter.resolving();
        let start = Instant::now();

        let source = self.resolver.resolve(url).await?;

        STAGE_DURATION
            .with_label_values(&["resolve"])
            .observe(start.elapsed().as_secs_f64());
        info!(
            job_id = %reporter.job_id(),
            resolver = self.resolver.name(),
            title = %source.title,
            container = %source.container,
            "Resolved source"
        );
        Ok(source)
    }

    async fn download(
        &self,
        source: &ResolvedSource,
        input: &StagedFile,
        reporter: &mut ProgressReporter,
    ) -> Result<u64, ConversionError> {
        reporter.downloading(0);
        let start = Instant::now();

        let mut stream = self
            .resolver
            .open_audio_stream(source)
            .await
            .map_err(|e| ConversionError::Download(format!("Failed to open audio stream: {}", e)))?;

        let mut file = tokio::fs::File::create(input.path()).await.map_err(|e| {
            ConversionError::Download(format!(
                "Failed to create {}: {}",
                input.path().display(),
                e
            ))
        })?;

        // Without a total the percent stays where the phase started.
        let total = stream.total_bytes.filter(|t| *t > 0);
        let mut written: u64 = 0;

        while let Some(chunk) = stream.chunks.next().await {
            let chunk = chunk
                .map_err(|e| ConversionError::Download(format!("Audio stream error: {}", e)))?;
            file.write_all(&chunk).await.map_err(|e| {
                ConversionError::Download(format!(
                    "Failed to write {}: {}",
                    input.path().display(),
                    e
                ))
            })?;

            written += chunk.len() as u64;
            DOWNLOADED_BYTES.inc_by(chunk.len() as u64);

            if let Some(total) = total {
                let percent = (written.saturating_mul(100) / total).min(100) as u8;
                reporter.downloading(percent);
            }
        }

        file.flush().await.map_err(|e| {
            ConversionError::Download(format!(
                "Failed to flush {}: {}",
                input.path().display(),
                e
            ))
        })?;

        STAGE_DURATION
            .with_label_values(&["download"])
            .observe(start.elapsed().as_secs_f64());
        info!(
            job_id = %reporter.job_id(),
            bytes = written,
            expected = ?total,
            "Downloaded source audio"
        );
        Ok(written)
    }

    async fn transcode_and_read(
        &self,
        input: &StagedFile,
        output: &StagedFile,
        reporter: &mut ProgressReporter,
    ) -> Result<Vec<u8>, ConversionError> {
        reporter.transcoding(0);
        let start = Instant::now();

        let job = TranscodeJob {
            job_id: reporter.job_id().to_string(),
            input_path: input.path().to_path_buf(),
            output_path: output.path().to_path_buf(),
            settings: self.settings.clone(),
        };

        let (progress_tx, mut progress_rx) =
            mpsc::channel::<TranscodeProgress>(PROGRESS_CHANNEL_CAPACITY);
        let transcode = self.transcoder.transcode(job, progress_tx);
        // Ends once the transcoder returns and its sender is dropped.
        let drain = async {
            while let Some(progress) = progress_rx.recv().await {
                reporter.transcoding(progress.whole_percent());
            }
        };
        let (outcome, ()) = tokio::join!(transcode, drain);
        let outcome = outcome?;

        STAGE_DURATION
            .with_label_values(&["transcode"])
            .observe(start.elapsed().as_secs_f64());
        info!(
            job_id = %reporter.job_id(),
            transcoder = self.transcoder.name(),
            input_format = ?outcome.input_format,
            duration_ms = outcome.duration_ms,
            "Transcode finished"
        );

        let start = Instant::now();
        let bytes = tokio::fs::read(output.path())
            .await
            .map_err(|source| ConversionError::Read {
                path: output.path().to_path_buf(),
                source,
            })?;
        STAGE_DURATION
            .with_label_values(&["read"])
            .observe(start.elapsed().as_secs_f64());
        debug!(job_id = %reporter.job_id(), bytes = bytes.len(), "Read converted audio");

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{ProgressPhase, ProgressStore};
    use crate::testing::{MockResolver, MockTranscoder};
    use tempfile::TempDir;

    fn pipeline(
        dir: &TempDir,
        resolver: &Arc<MockResolver>,
        transcoder: &Arc<MockTranscoder>,
    ) -> ConversionPipeline {
        ConversionPipeline::new(
            resolver.clone(),
            transcoder.clone(),
            StagingArea::in_dir(dir.path()),
        )
    }

    #[tokio::test]
    async fn test_transcode_job_uses_staged_paths_and_mp3_settings() {
        let dir = TempDir::new().unwrap();
        let resolver = Arc::new(MockResolver::new());
        resolver.set_container("m4a").await;
        let transcoder = Arc::new(MockTranscoder::new());
        let pipeline = pipeline(&dir, &resolver, &transcoder);

        let store = Arc::new(ProgressStore::new());
        let mut reporter = ProgressReporter::new(store, "job-1");
        pipeline
            .run(&ConversionRequest::new("https://youtu.be/abc"), &mut reporter)
            .await
            .unwrap();

        let calls = transcoder.recorded_transcodes().await;
        assert_eq!(calls.len(), 1);
        let job = &calls[0].job;
        assert_eq!(job.job_id, "job-1");
        assert_eq!(job.settings, TranscodeSettings::default());
        assert_eq!(job.input_path.extension().unwrap(), "m4a");
        assert_eq!(job.output_path.extension().unwrap(), "mp3");
        assert_eq!(job.input_path.parent().unwrap(), dir.path());
        // The input was fully written before the transcoder saw it
        assert_eq!(calls[0].input_size, Some(1000));
    }

    #[tokio::test]
    async fn test_stream_open_failure_is_download_error() {
        let dir = TempDir::new().unwrap();
        let resolver = Arc::new(MockResolver::new());
        resolver
            .set_open_error(crate::resolver::ResolverError::HttpStatus { status: 403 })
            .await;
        let transcoder = Arc::new(MockTranscoder::new());
        let pipeline = pipeline(&dir, &resolver, &transcoder);

        let store = Arc::new(ProgressStore::new());
        let mut reporter = ProgressReporter::new(store.clone(), "job-2");
        let err = pipeline
            .run(&ConversionRequest::new("https://youtu.be/abc"), &mut reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, ConversionError::Download(_)));
        assert_eq!(store.get().phase, ProgressPhase::Failed);
        assert_eq!(transcoder.transcode_count().await, 0);
        let stats = pipeline.staging().stats();
        assert_eq!(stats.allocated, 1);
        assert_eq!(stats.active, 0);
    }

    #[tokio::test]
    async fn test_missing_output_is_read_error() {
        let dir = TempDir::new().unwrap();
        let resolver = Arc::new(MockResolver::new());
        let transcoder = Arc::new(MockTranscoder::new());
        transcoder.set_skip_output(true).await;
        let pipeline = pipeline(&dir, &resolver, &transcoder);

        let store = Arc::new(ProgressStore::new());
        let mut reporter = ProgressReporter::new(store, "job-3");
        let err = pipeline
            .run(&ConversionRequest::new("https://youtu.be/abc"), &mut reporter)
            .await
            .unwrap_err();

        assert!(matches!(err, ConversionError::Read { .. }));
        assert_eq!(err.category(), "read");
        assert_eq!(pipeline.staging().stats().active, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_progress_without_percent_still_completes() {
        let dir = TempDir::new().unwrap();
        let resolver = Arc::new(MockResolver::new());
        let transcoder = Arc::new(MockTranscoder::new());
        transcoder.set_progress_steps(vec![None, Some(40.0)]).await;
        let pipeline = pipeline(&dir, &resolver, &transcoder);

        let store = Arc::new(ProgressStore::new());
        let mut reporter = ProgressReporter::new(store.clone(), "job-4");
        pipeline
            .run(&ConversionRequest::new("https://youtu.be/abc"), &mut reporter)
            .await
            .unwrap();

        assert_eq!(store.get().phase, ProgressPhase::Complete);
        assert_eq!(store.get().percent, 100);
    }
}
