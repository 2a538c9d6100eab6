//! Testing utilities and mock implementations.
//!
//! The mocks stand in for yt-dlp and ffmpeg so the whole conversion path can
//! run in-process against a temporary staging directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use tunegrab_core::testing::fixtures;
//!
//! let dir = tempfile::TempDir::new()?;
//! let harness = fixtures::harness(dir.path());
//! harness.resolver.set_title("My Song!").await;
//!
//! let result = harness.service.submit(ConversionRequest::new("https://youtu.be/validid")).await?;
//! assert_eq!(result.suggested_filename, "my_song_.mp3");
//! ```

mod mock_resolver;
mod mock_transcoder;

pub use mock_resolver::MockResolver;
pub use mock_transcoder::{MockTranscoder, RecordedTranscode};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;
    use std::sync::Arc;

    use super::{MockResolver, MockTranscoder};
    use crate::pipeline::ConversionPipeline;
    use crate::progress::ProgressStore;
    use crate::service::ConversionService;
    use crate::staging::StagingArea;

    /// A service wired to mocks, with handles to every collaborator.
    pub struct Harness {
        pub resolver: Arc<MockResolver>,
        pub transcoder: Arc<MockTranscoder>,
        pub progress: Arc<ProgressStore>,
        pub service: Arc<ConversionService>,
    }

    impl Harness {
        /// Staging area the service allocates from.
        pub fn staging(&self) -> &StagingArea {
            self.service.pipeline().staging()
        }
    }

    /// Builds a service staging files under `root`.
    pub fn harness(root: &Path) -> Harness {
        let resolver = Arc::new(MockResolver::new());
        let transcoder = Arc::new(MockTranscoder::new());
        let progress = Arc::new(ProgressStore::new());
        let pipeline = ConversionPipeline::new(
            resolver.clone(),
            transcoder.clone(),
            StagingArea::in_dir(root),
        );
        let service = Arc::new(ConversionService::new(pipeline, Arc::clone(&progress)));

        Harness {
            resolver,
            transcoder,
            progress,
            service,
        }
    }

    /// Number of entries in a directory; a missing directory counts as empty.
    pub fn dir_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }
}
