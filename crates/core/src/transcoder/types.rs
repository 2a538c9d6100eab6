//! Types for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Target audio format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// MPEG Audio Layer III
    Mp3,
}

impl AudioFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
        }
    }

    /// Returns the ffmpeg codec name for this format.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
        }
    }

    /// Returns the MIME type of files in this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
        }
    }
}

/// Encoding settings for an audio-only transcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeSettings {
    pub format: AudioFormat,
    /// Constant bitrate in kbps.
    pub bitrate_kbps: u32,
    /// Number of output channels.
    pub channels: u8,
    /// Output sample rate in Hz.
    pub sample_rate_hz: u32,
}

impl Default for TranscodeSettings {
    /// 128 kbps stereo MP3 at 44.1 kHz.
    fn default() -> Self {
        Self {
            format: AudioFormat::Mp3,
            bitrate_kbps: 128,
            channels: 2,
            sample_rate_hz: 44_100,
        }
    }
}

/// A transcode request.
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    pub job_id: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub settings: TranscodeSettings,
}

/// Progress report emitted while transcoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeProgress {
    pub job_id: String,
    /// Percent complete; `None` when the input duration is unknown.
    pub percent: Option<f32>,
    /// Seconds of output produced so far.
    pub time_secs: f64,
    /// Input duration, if probed.
    pub duration_secs: Option<f64>,
    /// Encoder speed, e.g. "12.3x".
    pub speed: Option<String>,
}

impl TranscodeProgress {
    /// Whole percent for display: missing values count as 0, the result is in 0..=100.
    pub fn whole_percent(&self) -> u8 {
        match self.percent {
            Some(p) if p.is_finite() => p.floor().clamp(0.0, 100.0) as u8,
            _ => 0,
        }
    }
}

/// Result of a finished transcode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeOutcome {
    pub job_id: String,
    pub output_path: PathBuf,
    /// Wall time in milliseconds.
    pub duration_ms: u64,
    /// Container of the input as reported by the probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_format: Option<String>,
}

/// Media file information from probing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_secs: f64,
    pub format: String,
    pub audio_codec: Option<String>,
    pub audio_bitrate_kbps: Option<u32>,
    pub audio_sample_rate: Option<u32>,
    pub audio_channels: Option<u8>,
}
