use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use super::{convert, handlers, middleware::metrics_middleware, progress};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config().server.max_body_bytes;

    // API routes
    let api_routes = Router::new()
        // Health and status
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        // Conversion
        .route("/convert", post(convert::convert))
        .route("/progress", get(progress::get_progress))
        .with_state(state);

    // Browsers read the filename from Content-Disposition
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);

    Router::new()
        .nest("/api", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
