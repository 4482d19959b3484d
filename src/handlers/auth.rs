use axum::{extract::State, response::Json};
use serde_json::json;

use crate::{
    errors::Result,
    handlers::AppState,
    middleware::AuthenticatedUser,
    models::{LoginRequest, RefreshRequest},
};

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>> {
    let response = state.auth.login(&request).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "data": response
    })))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>> {
    let tokens = state.auth.refresh(&request.refresh_token).await?;

    Ok(Json(json!({
        "message": "Token refreshed successfully",
        "data": tokens
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    state.auth.logout(user.id).await?;

    Ok(Json(json!({
        "message": "Logged out successfully",
        "data": null
    })))
}
