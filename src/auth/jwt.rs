use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::errors::{AppError, Result};
use crate::models::{ResourceKind, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenPurpose {
    Access,
    Refresh,
    PrivateAccess,
}

/// Signed payload plus the purpose tag and timestamps. The tag is optional on
/// the wire so that untagged tokens decode and then fail the purpose check.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims<T> {
    #[serde(flatten)]
    pub payload: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<TokenPurpose>,
    pub iat: i64,
    pub exp: i64,
}

/// Identity carried by login access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginClaims {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Capability minted by the privacy gate for exactly one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateAccessClaims {
    pub resource_id: Uuid,
    pub resource_type: ResourceKind,
    pub user_id: Uuid,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,
    #[error("Token expired")]
    Expired,
    #[error("Token was not issued for this purpose")]
    WrongPurpose,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

struct PurposeKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: i64,
}

impl PurposeKeys {
    fn new(secret: &str, ttl: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

pub struct TokenService {
    access: PurposeKeys,
    refresh: PurposeKeys,
    private_access: PurposeKeys,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access: PurposeKeys::new(&config.access_secret, config.access_expires_in),
            refresh: PurposeKeys::new(&config.refresh_secret, config.refresh_expires_in),
            private_access: PurposeKeys::new(
                &config.private_access_secret,
                config.private_access_expires_in,
            ),
        }
    }

    fn keys(&self, purpose: TokenPurpose) -> &PurposeKeys {
        match purpose {
            TokenPurpose::Access => &self.access,
            TokenPurpose::Refresh => &self.refresh,
            TokenPurpose::PrivateAccess => &self.private_access,
        }
    }

    /// Lifetime in seconds of tokens issued for `purpose`.
    pub fn ttl(&self, purpose: TokenPurpose) -> i64 {
        self.keys(purpose).ttl
    }

    pub fn issue<T: Serialize>(&self, purpose: TokenPurpose, payload: &T) -> Result<String> {
        self.issue_with_ttl(purpose, payload, self.ttl(purpose))
    }

    pub fn issue_with_ttl<T: Serialize>(
        &self,
        purpose: TokenPurpose,
        payload: &T,
        ttl_seconds: i64,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            payload,
            purpose: Some(purpose),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys(purpose).encoding_key,
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {}", e)))
    }

    /// Checks signature, expiry and that the token was issued for `purpose`.
    pub fn verify<T: DeserializeOwned>(
        &self,
        purpose: TokenPurpose,
        token: &str,
    ) -> std::result::Result<T, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims<T>>(token, &self.keys(purpose).decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        if data.claims.purpose != Some(purpose) {
            return Err(TokenError::WrongPurpose);
        }

        Ok(data.claims.payload)
    }
}
