//! Types for the resolver module.

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata of a resolved source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSource {
    /// The URL that was resolved.
    pub source_url: String,
    /// Human-readable title.
    pub title: String,
    /// Container extension of the audio track (e.g. "m4a", "webm").
    pub container: String,
    /// Direct URL of the audio track, if the resolver streams over HTTP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    /// Headers the media host expects.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub http_headers: HashMap<String, String>,
    /// Size of the audio track in bytes, when known up front.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_hint: Option<u64>,
    /// Duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl ResolvedSource {
    /// A source with only the fields every resolver must provide.
    pub fn new(
        source_url: impl Into<String>,
        title: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            title: title.into(),
            container: container.into(),
            media_url: None,
            http_headers: HashMap::new(),
            size_hint: None,
            duration_secs: None,
        }
    }
}

/// A readable audio byte stream with an optional size hint.
pub struct AudioStream {
    /// Total bytes the stream will yield, when known.
    pub total_bytes: Option<u64>,
    /// The byte chunks.
    pub chunks: BoxStream<'static, Result<Bytes, std::io::Error>>,
}

impl AudioStream {
    pub fn new(
        total_bytes: Option<u64>,
        chunks: BoxStream<'static, Result<Bytes, std::io::Error>>,
    ) -> Self {
        Self {
            total_bytes,
            chunks,
        }
    }

    /// Stream over in-memory chunks.
    pub fn from_chunks(chunks: Vec<Bytes>, total_bytes: Option<u64>) -> Self {
        Self::new(total_bytes, stream::iter(chunks.into_iter().map(Ok)).boxed())
    }
}

impl std::fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStream")
            .field("total_bytes", &self.total_bytes)
            .finish_non_exhaustive()
    }
}
