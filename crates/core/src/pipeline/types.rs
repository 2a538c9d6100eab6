//! Request and result types for conversion runs.

use serde::{Deserialize, Serialize};

/// A request to convert one source URL to audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub source_url: String,
}

impl ConversionRequest {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
        }
    }
}

/// The audio produced by a successful run.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// Complete encoded audio.
    pub audio_bytes: Vec<u8>,
    /// Sanitized title plus extension, e.g. `my_song_.mp3`.
    pub suggested_filename: String,
}
