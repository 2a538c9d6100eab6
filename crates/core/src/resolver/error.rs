//! Error types for the resolver module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving or opening a source.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The URL is not one the resolver understands.
    #[error("Unsupported URL: {url}")]
    UnsupportedUrl { url: String },

    /// The source exists in URL form but cannot be fetched (private, removed, region locked).
    #[error("Source unavailable: {reason}")]
    Unavailable { reason: String },

    /// yt-dlp binary not found.
    #[error("yt-dlp not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// yt-dlp ran but failed.
    #[error("Resolution failed: {reason}")]
    ResolveFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// yt-dlp output could not be understood.
    #[error("Failed to parse source metadata: {reason}")]
    ParseError { reason: String },

    /// The media host answered with a non-success status.
    #[error("Media request returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error while running the resolver.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolverError {
    /// Creates a new resolve failed error with stderr output.
    pub fn resolve_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ResolveFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether the source was not recognized or cannot be fetched.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::UnsupportedUrl { .. } | Self::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unavailable() {
        assert!(ResolverError::unavailable("Private video").is_unavailable());
        assert!(ResolverError::UnsupportedUrl {
            url: "x".to_string()
        }
        .is_unavailable());
        assert!(!ResolverError::resolve_failed("exit 1", None).is_unavailable());
        assert!(!ResolverError::HttpStatus { status: 403 }.is_unavailable());
    }

    #[test]
    fn test_display() {
        let err = ResolverError::unavailable("Video unavailable");
        assert_eq!(err.to_string(), "Source unavailable: Video unavailable");
    }
}
