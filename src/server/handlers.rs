//! Request handlers for the checklist and session endpoints.

use super::AppState;
use super::error::ApiError;
use crate::models::{DraftItem, ItemStatus, StatusUpdate};
use crate::{BUILD_TIMESTAMP, Error, GIT_COMMIT, VERSION};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path as AxumPath, State};
use serde::Deserialize;
use serde_json::{Value, json};

type ApiResult = Result<Json<Value>, ApiError>;

/// Request body for merging checklists
#[derive(Deserialize)]
pub struct MergeRequest {
    #[serde(default)]
    features: Vec<String>,
}

/// Request body for creating a session
#[derive(Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    checklists: Vec<DraftItem>,
}

/// Request body for updating one item's status
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    checklist_item_id: String,
    status: String,
    #[serde(default)]
    bug_id: Option<String>,
}

/// Merge the checklists of the selected features
pub async fn merge_checklists(
    State(state): State<AppState>,
    body: Result<Json<MergeRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    let checklists = state.catalog.merge(&request.features)?;

    Ok(Json(json!({ "success": true, "checklists": checklists })))
}

/// List the features available in the catalog
pub async fn list_features(State(state): State<AppState>) -> ApiResult {
    let features = state.catalog.features()?;

    Ok(Json(json!({ "success": true, "features": features })))
}

/// Confirm a selection as a new test session
pub async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    let session_id = state.sessions.create(request.checklists)?;

    Ok(Json(json!({ "success": true, "sessionId": session_id })))
}

/// Get a session's items
pub async fn get_session(
    State(state): State<AppState>,
    AxumPath(session_id): AxumPath<String>,
) -> ApiResult {
    let items = state.sessions.get(&session_id)?;

    Ok(Json(json!({ "success": true, "testData": items })))
}

/// Update one item's status and bug reference
pub async fn update_item(
    State(state): State<AppState>,
    AxumPath(session_id): AxumPath<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    state
        .sessions
        .item(&session_id, &request.checklist_item_id)?;
    let status = ItemStatus::parse(&request.status).ok_or_else(|| {
        Error::Validation(format!(
            "Invalid status: {} (expected Pending, Pass or Failed)",
            request.status
        ))
    })?;
    let update = StatusUpdate::new(status, request.bug_id);

    state
        .sessions
        .update_item(&session_id, &request.checklist_item_id, &update)?;

    Ok(Json(json!({ "success": true })))
}

/// Liveness and build info
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "version": VERSION,
        "commit": GIT_COMMIT,
        "built": BUILD_TIMESTAMP,
        "sessions": state.sessions.len()
    }))
}

/// JSON 404 for unknown routes
pub async fn route_not_found() -> ApiError {
    ApiError(Error::NotFound("Route not found.".to_string()))
}
