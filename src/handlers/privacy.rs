use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    errors::{AppError, Result},
    handlers::AppState,
    middleware::AuthenticatedUser,
    models::PinRequest,
};

pub const PRIVATE_ACCESS_HEADER: &str = "x-private-access";

pub async fn set_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(resource_id): Path<Uuid>,
    Json(request): Json<PinRequest>,
) -> Result<Json<serde_json::Value>> {
    state
        .privacy
        .set_password(user.id, resource_id, request.resource_type, &request.password)
        .await?;

    Ok(Json(json!({
        "message": "Password set successfully",
        "data": null
    })))
}

pub async fn verify_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(resource_id): Path<Uuid>,
    Json(request): Json<PinRequest>,
) -> Result<Json<serde_json::Value>> {
    let grant = state
        .privacy
        .verify_password(user.id, resource_id, request.resource_type, &request.password)
        .await?;

    Ok(Json(json!({
        "message": "Password verified",
        "data": grant.to_verify_response()
    })))
}

pub async fn private_content(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>> {
    let token = headers
        .get(PRIVATE_ACCESS_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Private access token required".to_string()))?;

    let resource = state.privacy.fetch_private(user.id, token).await?;

    Ok(Json(json!({
        "message": "Private content retrieved",
        "data": resource
    })))
}
