use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::library::{StoryLibrary, WriteOutcome};
use crate::models::Story;
use crate::search::{SearchRequest, SearchResponse};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

/// Run a library call on the blocking pool
async fn with_library<F, R>(state: &AppState, f: F) -> Result<R>
where
    F: FnOnce(StoryLibrary) -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    let library = state.library.clone();
    tokio::task::spawn_blocking(move || f(library)).await?
}

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InitResponse {
    pub indexed: usize,
}

/// Load the sample stories
pub async fn init(State(state): State<AppState>) -> Result<Json<InitResponse>> {
    let indexed = with_library(&state, |library| library.seed()).await?;
    Ok(Json(InitResponse { indexed }))
}

/// Add or replace a story
pub async fn save_story(
    State(state): State<AppState>,
    Json(story): Json<Story>,
) -> Result<Json<Story>> {
    let saved = with_library(&state, move |library| library.save(story)).await?;
    tracing::info!(id = %saved.id, "Story saved");
    Ok(Json(saved))
}

/// Replace an existing story
pub async fn update_story(
    State(state): State<AppState>,
    Json(story): Json<Story>,
) -> Result<Json<Story>> {
    let id = story.id.clone();
    let updated = story.clone();
    match with_library(&state, move |library| library.update(story)).await? {
        WriteOutcome::Applied => {
            tracing::info!(id = %id, "Story updated");
            Ok(Json(updated))
        }
        WriteOutcome::NotFound => Err(AppError::NotFound(format!("Story {} not found", id))),
    }
}

/// Delete a story
pub async fn delete_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let target = id.clone();
    match with_library(&state, move |library| library.delete(&target)).await? {
        WriteOutcome::Applied => {
            tracing::info!(id = %id, "Story deleted");
            Ok(MessageResponse::new(format!("Story {} deleted", id)))
        }
        WriteOutcome::NotFound => Err(AppError::NotFound(format!("Story {} not found", id))),
    }
}

/// Delete every story
pub async fn delete_all(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    with_library(&state, |library| library.delete_all()).await?;
    tracing::info!("All stories deleted");
    Ok(MessageResponse::new("All stories deleted"))
}

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub limit: Option<usize>,
}

/// Search story content
pub async fn query_content(
    State(state): State<AppState>,
    Path(content): Path<String>,
    Query(params): Query<QueryParams>,
) -> Result<Json<SearchResponse<Story>>> {
    let response = with_library(&state, move |library| {
        let limit = params
            .limit
            .unwrap_or(library.index().config().default_limit);
        library.query(&SearchRequest::new("content", content).with_limit(limit))
    })
    .await?;
    Ok(Json(response))
}
