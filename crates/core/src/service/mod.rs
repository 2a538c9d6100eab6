//! The conversion service: request validation, single-flight and progress.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::pipeline::{ConversionError, ConversionPipeline, ConversionRequest, ConversionResult};
use crate::progress::{ProgressReporter, ProgressSnapshot, ProgressStore};
use crate::resolver::is_supported_url;
use crate::staging::StagingStats;

/// Service status for operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Whether a conversion is running.
    pub busy: bool,
    pub staging: StagingStats,
}

/// Accepts conversion requests and runs at most one at a time.
pub struct ConversionService {
    pipeline: ConversionPipeline,
    progress: Arc<ProgressStore>,
    in_flight: Mutex<()>,
}

impl ConversionService {
    pub fn new(pipeline: ConversionPipeline, progress: Arc<ProgressStore>) -> Self {
        Self {
            pipeline,
            progress,
            in_flight: Mutex::new(()),
        }
    }

    pub fn pipeline(&self) -> &ConversionPipeline {
        &self.pipeline
    }

    /// Checks the request without side effects.
    pub fn validate_request(request: &ConversionRequest) -> Result<(), ConversionError> {
        let url = request.source_url.trim();
        if url.is_empty() {
            return Err(ConversionError::InvalidRequest(
                "A video URL is required".to_string(),
            ));
        }
        if !is_supported_url(url) {
            return Err(ConversionError::InvalidRequest(format!(
                "Not a supported video URL: {}",
                url
            )));
        }
        Ok(())
    }

    /// Validates and runs one conversion to completion.
    ///
    /// Invalid requests and submissions made while another run is active are
    /// rejected before anything is staged or published.
    pub async fn submit(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionResult, ConversionError> {
        Self::validate_request(&request)?;

        let _guard = self.in_flight.try_lock().map_err(|_| {
            warn!(url = %request.source_url, "Rejecting conversion, another one is running");
            ConversionError::Busy
        })?;

        let request = ConversionRequest::new(request.source_url.trim());
        let job_id = Uuid::new_v4().to_string();
        info!(job_id = %job_id, url = %request.source_url, "Accepted conversion request");

        let mut reporter = ProgressReporter::new(Arc::clone(&self.progress), job_id);
        self.pipeline.run(&request, &mut reporter).await
    }

    /// Latest progress snapshot.
    pub fn query_progress(&self) -> ProgressSnapshot {
        self.progress.get()
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            busy: self.in_flight.try_lock().is_err(),
            staging: self.pipeline.staging().stats(),
        }
    }
}
