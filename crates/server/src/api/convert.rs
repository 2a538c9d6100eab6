//! Conversion API handler.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use tunegrab_core::metrics::CONVERSIONS_TOTAL;
use tunegrab_core::{AudioFormat, ConversionError, ConversionRequest};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for starting a conversion
#[derive(Debug, Deserialize)]
pub struct ConvertBody {
    /// Video page URL
    #[serde(rename = "youtubeUrl")]
    pub youtube_url: String,
}

/// Error response for conversion failures
#[derive(Debug, Serialize)]
pub struct ConvertErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub category: &'static str,
}

/// A [`ConversionError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ConvertError(pub ConversionError);

impl ConvertError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ConversionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ConversionError::Busy => StatusCode::CONFLICT,
            ConversionError::Resolution(_) => StatusCode::BAD_GATEWAY,
            ConversionError::Download(_)
            | ConversionError::Transcode(_)
            | ConversionError::Read { .. }
            | ConversionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn summary(&self) -> &'static str {
        match &self.0 {
            ConversionError::InvalidRequest(_) => "Invalid request",
            ConversionError::Busy => "A conversion is already in progress",
            ConversionError::Resolution(_) => "Failed to resolve video",
            ConversionError::Download(_) => "Failed to download audio",
            ConversionError::Transcode(_) => "Failed to convert audio",
            ConversionError::Read { .. } => "Failed to read converted audio",
            ConversionError::Internal(_) => "Internal error",
        }
    }
}

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ConvertErrorResponse {
            error: self.summary().to_string(),
            details: self.0.details(),
            category: self.0.category(),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Convert a video URL to MP3 and return the file.
///
/// The run is spawned so it finishes and cleans up even if the client
/// disconnects before the response is written. A panicked run is reported
/// as `internal`.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ConvertBody>, JsonRejection>,
) -> Result<Response, ConvertError> {
    let Json(body) = body.map_err(|rejection| {
        ConvertError(ConversionError::InvalidRequest(rejection.body_text()))
    })?;

    let service = Arc::clone(state.service());
    let request = ConversionRequest::new(body.youtube_url);
    let result = tokio::spawn(async move { service.submit(request).await })
        .await
        .map_err(|e| {
            error!(error = %e, "Conversion task panicked");
            let err = ConversionError::Internal(format!("Conversion task failed: {}", e));
            CONVERSIONS_TOTAL.with_label_values(&[err.category()]).inc();
            ConvertError(err)
        })?
        .map_err(ConvertError)?;

    let disposition = format!("attachment; filename=\"{}\"", result.suggested_filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, AudioFormat::Mp3.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        result.audio_bytes,
    )
        .into_response())
}
