use anyhow::Result;
use serde::Deserialize;
use std::env;

/// Lowest bcrypt cost accepted for PIN hashes.
pub const MIN_PIN_HASH_COST: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_file_size: usize,
    pub upload_dir: String,
    pub public_base_url: String,
    pub jwt: JwtConfig,
    pub pin_hash_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub access_expires_in: i64,
    pub refresh_secret: String,
    pub refresh_expires_in: i64,
    pub private_access_secret: String,
    pub private_access_expires_in: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()?;

        let pin_hash_cost: u32 = env::var("PIN_HASH_COST")
            .unwrap_or_else(|_| MIN_PIN_HASH_COST.to_string())
            .parse()?;

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/cloud_storage".to_string()),
            port,
            max_file_size: env::var("MAX_FILE_SIZE")
                .unwrap_or_else(|_| "104857600".to_string()) // 100MB
                .parse()?,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            jwt: JwtConfig {
                access_secret: env::var("JWT_ACCESS_SECRET")
                    .unwrap_or_else(|_| "access-secret".to_string()),
                access_expires_in: env::var("JWT_ACCESS_EXPIRES_IN")
                    .unwrap_or_else(|_| "86400".to_string()) // 1 day
                    .parse()?,
                refresh_secret: env::var("JWT_REFRESH_SECRET")
                    .unwrap_or_else(|_| "refresh-secret".to_string()),
                refresh_expires_in: env::var("JWT_REFRESH_EXPIRES_IN")
                    .unwrap_or_else(|_| "2592000".to_string()) // 30 days
                    .parse()?,
                private_access_secret: env::var("JWT_PRIVATE_ACCESS_SECRET")
                    .unwrap_or_else(|_| "private-access-secret".to_string()),
                private_access_expires_in: env::var("JWT_PRIVATE_ACCESS_EXPIRES_IN")
                    .unwrap_or_else(|_| "3600".to_string()) // 1 hour
                    .parse()?,
            },
            pin_hash_cost: pin_hash_cost.max(MIN_PIN_HASH_COST),
        })
    }

    /// True when the in-process store should be used instead of Postgres.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}
