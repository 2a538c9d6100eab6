//! Trait definitions for the resolver module.

use async_trait::async_trait;

use super::error::ResolverError;
use super::types::{AudioStream, ResolvedSource};

/// A resolver that turns a source URL into metadata and an audio stream.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Returns the name of this resolver implementation.
    fn name(&self) -> &str;

    /// Resolves a URL into source metadata.
    ///
    /// Unknown or unavailable sources must fail with an error for which
    /// [`ResolverError::is_unavailable`] is true.
    async fn resolve(&self, url: &str) -> Result<ResolvedSource, ResolverError>;

    /// Opens the audio track of a resolved source for reading.
    async fn open_audio_stream(&self, source: &ResolvedSource)
        -> Result<AudioStream, ResolverError>;

    /// Validates that the resolver is properly configured and ready.
    async fn validate(&self) -> Result<(), ResolverError> {
        Ok(())
    }
}
