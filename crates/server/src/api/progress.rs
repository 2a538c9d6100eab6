//! Progress polling handler.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tunegrab_core::{ProgressPhase, ProgressSnapshot};

use crate::state::AppState;

/// Body of `GET /api/progress`.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    /// Percent complete of the current phase, 0 to 100.
    pub progress: u8,
    /// Human-readable status message.
    pub status: String,
    pub phase: ProgressPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProgressSnapshot> for ProgressResponse {
    fn from(snapshot: ProgressSnapshot) -> Self {
        Self {
            progress: snapshot.percent,
            status: snapshot.message,
            phase: snapshot.phase,
            job_id: snapshot.job_id,
            updated_at: snapshot.updated_at,
        }
    }
}

pub async fn get_progress(State(state): State<Arc<AppState>>) -> Json<ProgressResponse> {
    Json(ProgressResponse::from(state.service().query_progress()))
}
