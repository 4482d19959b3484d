use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{LoginClaims, PasswordService, TokenPurpose, TokenService};
use crate::database::Store;
use crate::errors::{AppError, Result};
use crate::models::*;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
    passwords: PasswordService,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenService>, passwords: PasswordService) -> Self {
        Self {
            store,
            tokens,
            passwords,
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let email = normalize_email(&request.email);
        let Some(user) = self.store.find_user_by_email(&email).await? else {
            warn!(%email, "Login attempt for unknown email");
            return Err(invalid());
        };

        if !self
            .passwords
            .verify_password(&request.password, &user.password_hash)
            .await?
        {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(invalid());
        }
        if !user.is_active() {
            return Err(AppError::Forbidden("User is inactive".to_string()));
        }

        self.store.set_logged_in(user.id, true).await?;
        let pair = self.issue_pair(&user)?;

        info!(user_id = %user.id, "User logged in");
        Ok(AuthResponse {
            id: user.id,
            name: user.full_name,
            email: user.email,
            role: user.role,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        })
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims: LoginClaims = self.tokens.verify(TokenPurpose::Refresh, refresh_token)?;

        let user = self
            .store
            .find_user(claims.id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;
        if !user.is_active() {
            return Err(AppError::Forbidden("User is inactive".to_string()));
        }
        if !user.is_logged_in {
            return Err(AppError::Unauthorized("User is logged out".to_string()));
        }

        self.issue_pair(&user)
    }

    pub async fn logout(&self, user_id: Uuid) -> Result<()> {
        self.store.set_logged_in(user_id, false).await?;
        info!(%user_id, "User logged out");
        Ok(())
    }

    /// Resolves a login access token to a logged-in user.
    pub async fn authenticate(&self, access_token: &str) -> Result<User> {
        let claims: LoginClaims = self.tokens.verify(TokenPurpose::Access, access_token)?;

        let user = self
            .store
            .find_user(claims.id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;
        if !user.is_logged_in {
            return Err(AppError::Unauthorized("You are not logged in".to_string()));
        }

        Ok(user)
    }

    fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        let claims = LoginClaims {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        };

        Ok(TokenPair {
            access_token: self.tokens.issue(TokenPurpose::Access, &claims)?,
            refresh_token: self.tokens.issue(TokenPurpose::Refresh, &claims)?,
        })
    }
}
