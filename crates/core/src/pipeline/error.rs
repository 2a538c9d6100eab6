//! Error types for conversion runs.

use std::path::PathBuf;
use thiserror::Error;

use crate::resolver::ResolverError;
use crate::transcoder::TranscoderError;

/// Why a conversion request did not produce audio.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The request was rejected before any work started.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Another conversion is already running.
    #[error("A conversion is already in progress")]
    Busy,

    /// The source could not be resolved.
    #[error("Failed to resolve source: {0}")]
    Resolution(#[from] ResolverError),

    /// Streaming the source audio to disk failed.
    #[error("Download failed: {0}")]
    Download(String),

    /// The transcoder failed.
    #[error("Conversion failed: {0}")]
    Transcode(#[from] TranscoderError),

    /// The transcoder reported success but its output could not be read.
    #[error("Failed to read converted file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The run ended abnormally, e.g. its task panicked.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConversionError {
    /// Stable machine-readable category.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Busy => "busy",
            Self::Resolution(_) => "resolution",
            Self::Download(_) => "download",
            Self::Transcode(_) => "transcode",
            Self::Read { .. } => "read",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the caller is at fault (or should retry later).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::Busy)
    }

    /// The underlying message, suitable for a `details` field.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::InvalidRequest(reason) | Self::Download(reason) | Self::Internal(reason) => {
                Some(reason.clone())
            }
            Self::Busy => None,
            Self::Resolution(e) => Some(e.to_string()),
            Self::Transcode(e) => Some(match e.stderr() {
                Some(stderr) => format!("{}: {}", e, stderr.trim()),
                None => e.to_string(),
            }),
            Self::Read { source, .. } => Some(source.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            ConversionError::InvalidRequest("empty".into()).category(),
            "invalid_request"
        );
        assert_eq!(ConversionError::Busy.category(), "busy");
        assert_eq!(
            ConversionError::from(ResolverError::unavailable("gone")).category(),
            "resolution"
        );
        assert_eq!(ConversionError::Download("eof".into()).category(), "download");
        assert_eq!(
            ConversionError::from(TranscoderError::Timeout { timeout_secs: 1 }).category(),
            "transcode"
        );
        let read = ConversionError::Read {
            path: PathBuf::from("/tmp/x.mp3"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(read.category(), "read");
        assert_eq!(
            ConversionError::Internal("task panicked".into()).category(),
            "internal"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(ConversionError::InvalidRequest("x".into()).is_client_error());
        assert!(ConversionError::Busy.is_client_error());
        assert!(!ConversionError::Download("x".into()).is_client_error());
        assert!(!ConversionError::Internal("x".into()).is_client_error());
    }

    #[test]
    fn test_details_include_engine_output() {
        let err = ConversionError::from(TranscoderError::conversion_failed(
            "FFmpeg exited with code: Some(1)",
            Some("Invalid data found\n".to_string()),
        ));
        let details = err.details().unwrap();
        assert!(details.contains("exited with code"));
        assert!(details.ends_with("Invalid data found"));
        assert!(ConversionError::Busy.details().is_none());
    }
}
