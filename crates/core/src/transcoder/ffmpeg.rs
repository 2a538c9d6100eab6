//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Deserialize;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::TranscoderConfig;
use super::error::TranscoderError;
use super::traits::Transcoder;
use super::types::{MediaInfo, TranscodeJob, TranscodeOutcome, TranscodeProgress, TranscodeSettings};

static OUT_TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"out_time_ms=(\d+)").unwrap());
static SPEED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"speed=\s*(\d+\.?\d*)x").unwrap());

/// FFmpeg-based transcoder implementation.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default())
    }

    /// Builds ffmpeg arguments for an audio-only encode.
    fn build_args(
        &self,
        input_path: &Path,
        output_path: &Path,
        settings: &TranscodeSettings,
    ) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            // Drop video and cover streams
            "-vn".to_string(),
            "-c:a".to_string(),
            settings.format.ffmpeg_codec().to_string(),
            "-b:a".to_string(),
            format!("{}k", settings.bitrate_kbps),
            "-ac".to_string(),
            settings.channels.to_string(),
            "-ar".to_string(),
            settings.sample_rate_hz.to_string(),
        ];

        // Log level
        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        // Progress output for parsing
        args.extend(["-progress".to_string(), "pipe:2".to_string()]);

        // Extra args
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        // Output
        args.push(output_path.to_string_lossy().to_string());

        args
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, output: &str) -> Result<MediaInfo, TranscoderError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: String,
            duration: Option<String>,
            size: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
            codec_name: Option<String>,
            bit_rate: Option<String>,
            sample_rate: Option<String>,
            channels: Option<u8>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| TranscoderError::ParseError {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;

        let duration_secs = probe
            .format
            .duration
            .as_ref()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        let size_bytes = probe
            .format
            .size
            .as_ref()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let audio_stream = probe.streams.iter().find(|s| s.codec_type == "audio");

        let format_name = probe
            .format
            .format_name
            .split(',')
            .next()
            .unwrap_or("unknown");

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes,
            duration_secs,
            format: format_name.to_string(),
            audio_codec: audio_stream.and_then(|s| s.codec_name.clone()),
            audio_bitrate_kbps: audio_stream
                .and_then(|s| s.bit_rate.as_ref())
                .and_then(|b| b.parse::<u32>().ok())
                .map(|b| b / 1000),
            audio_sample_rate: audio_stream
                .and_then(|s| s.sample_rate.as_ref())
                .and_then(|r| r.parse::<u32>().ok()),
            audio_channels: audio_stream.and_then(|s| s.channels),
        })
    }

    /// Percent of `duration_secs` covered by `time_secs`, if the duration is known.
    fn percent_of(time_secs: f64, duration_secs: Option<f64>) -> Option<f32> {
        match duration_secs {
            Some(dur) if dur > 0.0 => Some((time_secs / dur * 100.0).clamp(0.0, 100.0) as f32),
            _ => None,
        }
    }

    /// Reads ffmpeg's progress stream until it closes, then waits for exit.
    async fn drive(
        child: &mut Child,
        stderr: ChildStderr,
        job_id: &str,
        duration_secs: Option<f64>,
        progress_tx: &mpsc::Sender<TranscodeProgress>,
        progress_interval: Duration,
    ) -> std::io::Result<(ExitStatus, String)> {
        // Metadata echoed in warnings is not always UTF-8
        let mut segments = BufReader::new(stderr).split(b'\n');
        let mut current_time = 0.0;
        let mut current_speed = None;
        let mut last_progress_send: Option<Instant> = None;
        let mut error_output = String::new();

        while let Some(raw) = segments.next_segment().await? {
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches('\r');

            // Capture error output
            if line.contains("Error") || line.contains("error") {
                error_output.push_str(line);
                error_output.push('\n');
            }

            if let Some(caps) = OUT_TIME_RE.captures(line) {
                if let Some(us) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) {
                    // ffmpeg reports microseconds despite the key name
                    current_time = us / 1_000_000.0;
                }
            }

            if let Some(caps) = SPEED_RE.captures(line) {
                if let Some(speed) = caps.get(1) {
                    current_speed = Some(format!("{}x", speed.as_str()));
                }
            }

            // Each progress block ends with a progress=continue|end line
            if line.starts_with("progress=") {
                let due = last_progress_send.is_none_or(|t| t.elapsed() >= progress_interval);
                if due || line == "progress=end" {
                    let progress = TranscodeProgress {
                        job_id: job_id.to_string(),
                        percent: Self::percent_of(current_time, duration_secs),
                        time_secs: current_time,
                        duration_secs,
                        speed: current_speed.clone(),
                    };
                    // Non-blocking send
                    let _ = progress_tx.try_send(progress);
                    last_progress_send = Some(Instant::now());
                }
            }
        }

        let status = child.wait().await?;
        Ok((status, error_output))
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscoderError> {
        if !path.exists() {
            return Err(TranscoderError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscoderError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    TranscoderError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(TranscoderError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, &stdout)
    }

    async fn transcode(
        &self,
        job: TranscodeJob,
        progress_tx: mpsc::Sender<TranscodeProgress>,
    ) -> Result<TranscodeOutcome, TranscoderError> {
        let start = Instant::now();

        if !job.input_path.exists() {
            return Err(TranscoderError::InputNotFound {
                path: job.input_path.clone(),
            });
        }

        // Duration drives the percent; without it progress is reported as unknown
        let input_info = match self.probe(&job.input_path).await {
            Ok(info) => Some(info),
            Err(e) => {
                debug!(job_id = %job.job_id, error = %e, "Probe failed, progress percent unavailable");
                None
            }
        };
        let duration_secs = input_info
            .as_ref()
            .map(|i| i.duration_secs)
            .filter(|d| *d > 0.0);

        let args = self.build_args(&job.input_path, &job.output_path, &job.settings);
        debug!(job_id = %job.job_id, ?args, "Starting ffmpeg");

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscoderError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    TranscoderError::Io(e)
                }
            })?;

        let stderr = child.stderr.take().ok_or_else(|| {
            TranscoderError::Io(std::io::Error::other("ffmpeg stderr was not captured"))
        })?;
        let progress_interval = Duration::from_millis(self.config.progress_interval_ms);

        let result = {
            let work = Self::drive(
                &mut child,
                stderr,
                &job.job_id,
                duration_secs,
                &progress_tx,
                progress_interval,
            );
            match self.config.timeout_secs {
                Some(secs) => timeout(Duration::from_secs(secs), work).await.ok(),
                None => Some(work.await),
            }
        };

        match result {
            Some(Ok((status, error_output))) => {
                if !status.success() {
                    return Err(TranscoderError::conversion_failed(
                        format!("FFmpeg exited with code: {:?}", status.code()),
                        if error_output.is_empty() {
                            None
                        } else {
                            Some(error_output)
                        },
                    ));
                }
            }
            Some(Err(e)) => return Err(TranscoderError::Io(e)),
            None => {
                // Kill the process on timeout
                let _ = child.kill().await;
                return Err(TranscoderError::Timeout {
                    timeout_secs: self.config.timeout_secs.unwrap_or_default(),
                });
            }
        }

        Ok(TranscodeOutcome {
            job_id: job.job_id.clone(),
            output_path: job.output_path.clone(),
            duration_ms: start.elapsed().as_millis() as u64,
            input_format: input_info.map(|i| i.format),
        })
    }

    async fn validate(&self) -> Result<(), TranscoderError> {
        // Check ffmpeg exists
        if let Err(e) = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
        {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(TranscoderError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            return Err(TranscoderError::Io(e));
        }

        // Check ffprobe exists
        if let Err(e) = Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await
        {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(TranscoderError::FfprobeNotFound {
                    path: self.config.ffprobe_path.clone(),
                });
            }
            return Err(TranscoderError::Io(e));
        }

        Ok(())
    }
}
