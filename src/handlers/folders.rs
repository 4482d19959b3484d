use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    errors::Result,
    handlers::AppState,
    middleware::AuthenticatedUser,
    models::FolderNameRequest,
};

pub async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<FolderNameRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let folder = state
        .folders
        .create(user.id, request.validated_name()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Folder created successfully",
            "data": folder
        })),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    let folders = state.folders.list(user.id).await?;

    Ok(Json(json!({
        "message": "Folders retrieved successfully",
        "data": folders
    })))
}

pub async fn get(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(folder_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let folder = state.folders.get(user.id, folder_id).await?;

    Ok(Json(json!({
        "message": "Folder retrieved successfully",
        "data": folder
    })))
}

pub async fn rename(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(folder_id): Path<Uuid>,
    Json(request): Json<FolderNameRequest>,
) -> Result<Json<serde_json::Value>> {
    let folder = state
        .folders
        .rename(folder_id, user.id, request.validated_name()?)
        .await?;

    Ok(Json(json!({
        "message": "Folder renamed successfully",
        "data": folder
    })))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(folder_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    state.folders.delete(folder_id, user.id).await?;

    Ok(Json(json!({
        "message": "Folder and its files deleted successfully",
        "data": null
    })))
}
