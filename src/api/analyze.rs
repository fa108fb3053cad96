//! Analyze, save and history endpoints

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use super::auth::{AuthUser, require_user};
use super::error::ApiError;
use crate::Error;
use crate::comment::AnalysisResult;
use crate::db::{HISTORY_LIMIT, NewComment, StoredComment};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
    /// Cursor from a previous response
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    /// Absent and `null` both count as an empty batch
    #[serde(default)]
    pub comments: Option<Vec<NewComment>>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub message: &'static str,
    pub count: usize,
}

/// Fetch, clean and score one page of comments for a post
async fn analyze(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(req) = payload.map_err(|e| Error::Validation(e.body_text()))?;

    let url = req.url.unwrap_or_default();
    let token = req.next_token.as_deref().filter(|t| !t.is_empty());

    let result = state.analyzer.analyze(&url, token).await?;
    Ok(Json(result))
}

/// Persist analyzed comments for the caller
async fn save(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveResponse>), ApiError> {
    let Json(req) = payload.map_err(|e| Error::Validation(e.body_text()))?;

    let comments = req.comments.unwrap_or_default();
    let count = state
        .comments
        .save_batch(&user.id, req.url.as_deref(), &comments)?;

    Ok((
        StatusCode::CREATED,
        Json(SaveResponse {
            message: "Comments saved successfully",
            count,
        }),
    ))
}

/// The caller's saved comments, newest first
async fn history(
    State(state): State<Arc<ApiState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<StoredComment>>, ApiError> {
    tracing::debug!(user_id = %user.id, email = %user.email, "loading history");
    let comments = state.comments.history(&user.id, HISTORY_LIMIT)?;
    Ok(Json(comments))
}

/// Build analyze router
pub fn router(state: Arc<ApiState>) -> Router {
    let protected = Router::new()
        .route("/api/analyze/save", post(save))
        .route("/api/analyze/history", get(history))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    Router::new()
        .route("/api/analyze", post(analyze))
        .merge(protected)
        .with_state(state)
}
