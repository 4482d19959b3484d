use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    errors::AppError,
    handlers::AppState,
    models::Role,
};

/// Caller identity resolved from a login access token. The token must carry
/// the access purpose and its user must still be logged in.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized("You are not authorized".to_string()))?;

        // Both "Bearer <token>" and a bare token are accepted.
        let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header);

        let user = state.auth.authenticate(token.trim()).await?;

        Ok(AuthenticatedUser {
            id: user.id,
            email: user.email,
            role: user.role,
        })
    }
}
