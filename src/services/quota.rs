use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::database::Store;
use crate::errors::{AppError, Result};
use crate::models::{StorageStatus, User};

/// Admission policy for growing a user's usage by `size` gigabytes.
///
/// Stores call this inside the same critical section or transaction that
/// performs the increment, so the decision and the write cannot drift apart.
pub fn admission(user: Option<&User>, size: f64) -> Result<()> {
    let user = user.ok_or_else(|| AppError::NotFound("User".to_string()))?;

    if !user.is_active() {
        return Err(AppError::Forbidden("User is inactive".to_string()));
    }

    if user.used_storage + size > user.storage_limit {
        return Err(AppError::QuotaExceeded);
    }

    Ok(())
}

/// Read side of the quota ledger. Reservations and releases happen inside the
/// store's compound operations; this answers "would it fit" and "how much is
/// left".
#[derive(Clone)]
pub struct QuotaLedger {
    store: Arc<dyn Store>,
}

impl QuotaLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Early rejection before any bytes are written. The authoritative check
    /// is repeated atomically by `Store::create_file`.
    pub async fn admit(&self, user_id: Uuid, size: f64) -> Result<()> {
        let user = self.store.find_user(user_id).await?;
        admission(user.as_ref(), size).map_err(|e| {
            if matches!(e, AppError::QuotaExceeded) {
                warn!(%user_id, size, "Upload rejected: storage quota exceeded");
            }
            e
        })
    }

    pub async fn status(&self, user_id: Uuid) -> Result<StorageStatus> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(StorageStatus::new(user.storage_limit, user.used_storage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, UserStatus};
    use chrono::Utc;

    fn user(limit: f64, used: f64, status: UserStatus) -> User {
        User {
            id: Uuid::new_v4(),
            email: "quota@example.com".to_string(),
            full_name: "Quota".to_string(),
            password_hash: String::new(),
            role: Role::User,
            status,
            is_logged_in: true,
            storage_limit: limit,
            used_storage: used,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_admission_policy() {
        let active = user(1.0, 0.9, UserStatus::Active);
        assert!(admission(Some(&active), 0.05).is_ok());
        assert!(matches!(
            admission(Some(&active), 0.2),
            Err(AppError::QuotaExceeded)
        ));
    }

    #[test]
    fn test_admission_rejects_missing_and_inactive_users() {
        assert!(matches!(admission(None, 0.0), Err(AppError::NotFound(_))));

        let inactive = user(1.0, 0.0, UserStatus::Inactive);
        assert!(matches!(
            admission(Some(&inactive), 0.0),
            Err(AppError::Forbidden(_))
        ));
    }
}
