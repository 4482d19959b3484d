use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{PasswordService, PrivateAccessClaims, TokenPurpose, TokenService};
use crate::database::Store;
use crate::errors::{AppError, Result};
use crate::models::*;

/// Outcome of a successful PIN check.
#[derive(Debug)]
pub struct PrivateAccessGrant {
    pub access_token: String,
    pub expires_in: i64,
    pub resource: PrivateResource,
}

impl PrivateAccessGrant {
    pub fn to_verify_response(&self) -> VerifyPasswordResponse {
        VerifyPasswordResponse {
            access_granted: true,
            access_token: self.access_token.clone(),
            expires_in: self.expires_in,
            resource_type: match self.resource {
                PrivateResource::File(_) => ResourceKind::File,
                PrivateResource::Folder(_) => ResourceKind::Folder,
            },
            resource_id: self.resource.id(),
        }
    }
}

/// PIN protection for files and folders. Setting a PIN locks the resource;
/// verifying it mints a short-lived capability token bound to one resource
/// and one user, which is then exchanged for the content.
#[derive(Clone)]
pub struct PrivacyGate {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
    passwords: PasswordService,
}

impl PrivacyGate {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenService>, passwords: PasswordService) -> Self {
        Self {
            store,
            tokens,
            passwords,
        }
    }

    /// Locks a resource behind a 4-digit PIN, replacing any previous PIN.
    pub async fn set_password(
        &self,
        user_id: Uuid,
        resource_id: Uuid,
        kind: ResourceKind,
        pin: &str,
    ) -> Result<()> {
        validate_pin(pin, true)?;

        match kind {
            ResourceKind::File => {
                let file = self.find_file(resource_id).await?;
                ensure_owner(file.user_id, user_id)?;
            }
            ResourceKind::Folder => {
                let folder = self.find_folder(resource_id).await?;
                ensure_owner(folder.user_id, user_id)?;
            }
        }

        let pin_hash = self.passwords.hash_password(pin).await?;
        let locked = match kind {
            ResourceKind::File => self.store.lock_file(resource_id, &pin_hash).await?.is_some(),
            ResourceKind::Folder => self.store.lock_folder(resource_id, &pin_hash).await?.is_some(),
        };
        if !locked {
            return Err(not_found(kind));
        }

        info!(%resource_id, resource_type = %kind, %user_id, "Resource locked with PIN");
        Ok(())
    }

    pub async fn verify_password(
        &self,
        user_id: Uuid,
        resource_id: Uuid,
        kind: ResourceKind,
        pin: &str,
    ) -> Result<PrivateAccessGrant> {
        validate_pin(pin, false)?;

        let (owner_id, is_private, pin_hash) = match kind {
            ResourceKind::File => {
                let file = self.find_file(resource_id).await?;
                (file.user_id, file.is_private, file.pin_hash)
            }
            ResourceKind::Folder => {
                let folder = self.find_folder(resource_id).await?;
                (folder.user_id, folder.is_private, folder.pin_hash)
            }
        };
        if owner_id != user_id {
            return Err(not_found(kind));
        }

        let pin_hash = match pin_hash {
            Some(hash) if is_private => hash,
            _ => {
                return Err(AppError::BadRequest(
                    "This resource is not password protected".to_string(),
                ))
            }
        };

        if !self.passwords.verify_password(pin, &pin_hash).await? {
            warn!(%resource_id, %user_id, "Invalid PIN for private resource");
            return Err(AppError::Unauthorized("Invalid password".to_string()));
        }

        let claims = PrivateAccessClaims {
            resource_id,
            resource_type: kind,
            user_id,
        };
        let access_token = self.tokens.issue(TokenPurpose::PrivateAccess, &claims)?;
        let resource = self.load(resource_id, kind).await?;

        info!(%resource_id, resource_type = %kind, %user_id, "Private access granted");
        Ok(PrivateAccessGrant {
            access_token,
            expires_in: self.tokens.ttl(TokenPurpose::PrivateAccess),
            resource,
        })
    }

    /// Exchanges a private-access token for the resource it names. The PIN is
    /// not checked again.
    pub async fn fetch_private(&self, user_id: Uuid, token: &str) -> Result<PrivateResource> {
        let claims: PrivateAccessClaims = self.tokens.verify(TokenPurpose::PrivateAccess, token)?;

        if claims.user_id != user_id {
            warn!(%user_id, token_user = %claims.user_id, "Private access token used by another user");
            return Err(AppError::Forbidden(
                "Access token does not belong to this user".to_string(),
            ));
        }

        self.load(claims.resource_id, claims.resource_type).await
    }

    async fn load(&self, resource_id: Uuid, kind: ResourceKind) -> Result<PrivateResource> {
        match kind {
            ResourceKind::File => Ok(PrivateResource::File(self.find_file(resource_id).await?)),
            ResourceKind::Folder => {
                let folder = self.find_folder(resource_id).await?;
                let query = FileQuery {
                    include_private: true,
                    ..FileQuery::in_folder(resource_id)
                };
                let files = self.store.list_files(folder.user_id, &query).await?;
                Ok(PrivateResource::Folder(FolderWithFiles { folder, files }))
            }
        }
    }

    async fn find_file(&self, id: Uuid) -> Result<FileRecord> {
        self.store
            .find_file(id)
            .await?
            .ok_or_else(|| not_found(ResourceKind::File))
    }

    async fn find_folder(&self, id: Uuid) -> Result<FolderRecord> {
        self.store
            .find_folder(id)
            .await?
            .ok_or_else(|| not_found(ResourceKind::Folder))
    }
}

fn not_found(kind: ResourceKind) -> AppError {
    match kind {
        ResourceKind::File => AppError::NotFound("File".to_string()),
        ResourceKind::Folder => AppError::NotFound("Folder".to_string()),
    }
}

fn ensure_owner(owner_id: Uuid, user_id: Uuid) -> Result<()> {
    if owner_id != user_id {
        return Err(AppError::Forbidden(
            "You do not have access to this resource".to_string(),
        ));
    }
    Ok(())
}
