use bcrypt::{hash, verify};

use crate::errors::{AppError, Result};

/// bcrypt hashing for account passwords and resource PINs. Both operations
/// run on the blocking pool so they never stall the request executor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))
    }

    pub async fn verify_password(&self, password: &str, hashed: &str) -> Result<bool> {
        let password = password.to_string();
        let hashed = hashed.to_string();

        tokio::task::spawn_blocking(move || verify(password, &hashed))
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to verify password: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_password_hashing_and_verification() {
        let passwords = PasswordService::new(bcrypt::DEFAULT_COST);
        let hash = passwords.hash_password("1234").await.unwrap();

        assert!(hash.starts_with("$2"));
        assert!(passwords.verify_password("1234", &hash).await.unwrap());
        assert!(!passwords.verify_password("5678", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_an_error() {
        let passwords = PasswordService::new(4);
        assert!(passwords.verify_password("1234", "not-a-hash").await.is_err());
    }
}
