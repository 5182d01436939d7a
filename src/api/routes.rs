use crate::api::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        // Story management
        .route("/init", get(handlers::init))
        .route("/save", post(handlers::save_story))
        .route("/update", post(handlers::update_story))
        .route("/delete/:id", get(handlers::delete_story))
        .route("/deleteAll", get(handlers::delete_all))
        // Search
        .route("/query/:content", get(handlers::query_content))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
