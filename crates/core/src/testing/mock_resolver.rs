//! Mock resolver for testing.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

use crate::resolver::{AudioStream, ResolvedSource, Resolver, ResolverError};

/// Mock implementation of the Resolver trait.
///
/// Provides controllable behavior for testing:
/// - Configure the title, container and audio payload
/// - Hide the total size to exercise unknown-length downloads
/// - Inject resolve, open and mid-stream failures
/// - Hold resolution until released, to keep a run in flight
///
/// # Example
///
/// ```rust,ignore
/// use tunegrab_core::testing::MockResolver;
///
/// let resolver = MockResolver::new();
/// resolver.set_title("My Song!").await;
/// resolver.set_payload(vec![0u8; 1000]).await;
///
/// let source = resolver.resolve("https://youtu.be/validid").await?;
/// assert_eq!(resolver.resolve_calls().await, vec!["https://youtu.be/validid"]);
/// ```
#[derive(Debug)]
pub struct MockResolver {
    title: Arc<RwLock<String>>,
    container: Arc<RwLock<String>>,
    payload: Arc<RwLock<Vec<u8>>>,
    /// Size of each streamed chunk in bytes.
    chunk_size: Arc<RwLock<usize>>,
    /// Whether the stream reports its total size.
    report_size: Arc<RwLock<bool>>,
    /// If set, the next resolve fails with this error.
    next_error: Arc<RwLock<Option<ResolverError>>>,
    /// If set, the next open fails with this error.
    open_error: Arc<RwLock<Option<ResolverError>>>,
    /// Fail the stream after this many chunks.
    fail_after_chunks: Arc<RwLock<Option<usize>>>,
    /// If set, resolve waits for a notification before returning.
    gate: Arc<RwLock<Option<Arc<Notify>>>>,
    resolve_calls: Arc<RwLock<Vec<String>>>,
    open_calls: Arc<RwLock<usize>>,
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResolver {
    /// Create a mock resolving every URL to a 1000-byte webm source.
    pub fn new() -> Self {
        Self {
            title: Arc::new(RwLock::new("Test Video".to_string())),
            container: Arc::new(RwLock::new("webm".to_string())),
            payload: Arc::new(RwLock::new(vec![0x1a; 1000])),
            chunk_size: Arc::new(RwLock::new(100)),
            report_size: Arc::new(RwLock::new(true)),
            next_error: Arc::new(RwLock::new(None)),
            open_error: Arc::new(RwLock::new(None)),
            fail_after_chunks: Arc::new(RwLock::new(None)),
            gate: Arc::new(RwLock::new(None)),
            resolve_calls: Arc::new(RwLock::new(Vec::new())),
            open_calls: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn set_title(&self, title: impl Into<String>) {
        *self.title.write().await = title.into();
    }

    pub async fn set_container(&self, container: impl Into<String>) {
        *self.container.write().await = container.into();
    }

    /// Set the audio bytes served by the stream.
    pub async fn set_payload(&self, payload: Vec<u8>) {
        *self.payload.write().await = payload;
    }

    pub async fn set_chunk_size(&self, chunk_size: usize) {
        *self.chunk_size.write().await = chunk_size.max(1);
    }

    /// Whether the stream reports its total size.
    pub async fn set_report_size(&self, report: bool) {
        *self.report_size.write().await = report;
    }

    /// Configure the next resolve to fail with the given error.
    pub async fn set_next_error(&self, error: ResolverError) {
        *self.next_error.write().await = Some(error);
    }

    /// Configure the next stream open to fail with the given error.
    pub async fn set_open_error(&self, error: ResolverError) {
        *self.open_error.write().await = Some(error);
    }

    /// Make the stream yield an error after `chunks` chunks.
    pub async fn set_fail_after_chunks(&self, chunks: usize) {
        *self.fail_after_chunks.write().await = Some(chunks);
    }

    /// Hold every resolve until the returned handle is notified.
    pub async fn hold_resolve(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.write().await = Some(Arc::clone(&notify));
        notify
    }

    /// URLs passed to resolve, in order.
    pub async fn resolve_calls(&self) -> Vec<String> {
        self.resolve_calls.read().await.clone()
    }

    /// Number of streams opened.
    pub async fn open_count(&self) -> usize {
        *self.open_calls.read().await
    }
}

#[async_trait]
impl Resolver for MockResolver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn resolve(&self, url: &str) -> Result<ResolvedSource, ResolverError> {
        self.resolve_calls.write().await.push(url.to_string());

        let gate = self.gate.read().await.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let mut source = ResolvedSource::new(
            url,
            self.title.read().await.clone(),
            self.container.read().await.clone(),
        );
        source.size_hint = Some(self.payload.read().await.len() as u64);
        source.duration_secs = Some(180.0);
        Ok(source)
    }

    async fn open_audio_stream(
        &self,
        _source: &ResolvedSource,
    ) -> Result<AudioStream, ResolverError> {
        *self.open_calls.write().await += 1;

        if let Some(err) = self.open_error.write().await.take() {
            return Err(err);
        }

        let payload = self.payload.read().await.clone();
        let chunk_size = *self.chunk_size.read().await;
        let total = if *self.report_size.read().await {
            Some(payload.len() as u64)
        } else {
            None
        };

        let chunks: Vec<Bytes> = payload
            .chunks(chunk_size)
            .map(Bytes::copy_from_slice)
            .collect();

        match *self.fail_after_chunks.read().await {
            Some(n) => {
                let items = chunks
                    .into_iter()
                    .take(n)
                    .map(Ok)
                    .chain(std::iter::once(Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "connection reset by peer",
                    ))));
                Ok(AudioStream::new(total, stream::iter(items).boxed()))
            }
            None => Ok(AudioStream::from_chunks(chunks, total)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(stream: AudioStream) -> (Vec<u8>, Option<std::io::Error>) {
        let mut bytes = Vec::new();
        let mut chunks = stream.chunks;
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(c) => bytes.extend_from_slice(&c),
                Err(e) => return (bytes, Some(e)),
            }
        }
        (bytes, None)
    }

    #[tokio::test]
    async fn test_resolve_and_stream() {
        let resolver = MockResolver::new();
        resolver.set_title("My Song!").await;

        let source = resolver.resolve("https://youtu.be/validid").await.unwrap();
        assert_eq!(source.title, "My Song!");
        assert_eq!(source.container, "webm");

        let stream = resolver.open_audio_stream(&source).await.unwrap();
        assert_eq!(stream.total_bytes, Some(1000));
        let (bytes, err) = collect(stream).await;
        assert_eq!(bytes.len(), 1000);
        assert!(err.is_none());
        assert_eq!(resolver.resolve_calls().await, vec!["https://youtu.be/validid"]);
        assert_eq!(resolver.open_count().await, 1);
    }

    #[tokio::test]
    async fn test_error_injection_is_consumed() {
        let resolver = MockResolver::new();
        resolver
            .set_next_error(ResolverError::unavailable("Video unavailable"))
            .await;

        let err = resolver.resolve("https://youtu.be/x").await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(resolver.resolve("https://youtu.be/x").await.is_ok());
    }

    #[tokio::test]
    async fn test_stream_failure_after_chunks() {
        let resolver = MockResolver::new();
        resolver.set_fail_after_chunks(3).await;
        resolver.set_report_size(false).await;

        let source = resolver.resolve("https://youtu.be/x").await.unwrap();
        let stream = resolver.open_audio_stream(&source).await.unwrap();
        assert_eq!(stream.total_bytes, None);
        let (bytes, err) = collect(stream).await;
        assert_eq!(bytes.len(), 300);
        assert_eq!(err.unwrap().kind(), std::io::ErrorKind::ConnectionReset);
    }
}
