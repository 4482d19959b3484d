#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cloud_storage_server::{
    auth::PasswordService,
    config::{Config, JwtConfig, MIN_PIN_HASH_COST},
    database::{MemoryStore, Store},
    handlers::AppState,
    models::{NewUser, User},
    storage::{LocalStorage, Storage},
};
use tempfile::TempDir;

pub const PASSWORD: &str = "password123";
pub const EPSILON: f64 = 1e-9;

pub struct TestContext {
    pub state: AppState,
    pub store: Arc<dyn Store>,
    pub upload_dir: TempDir,
}

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        database_url: "memory://".to_string(),
        port: 0,
        max_file_size: 10 * 1024 * 1024,
        upload_dir: upload_dir.to_string_lossy().to_string(),
        public_base_url: "http://localhost:5000".to_string(),
        jwt: JwtConfig {
            access_secret: "test-access-secret".to_string(),
            access_expires_in: 3600,
            refresh_secret: "test-refresh-secret".to_string(),
            refresh_expires_in: 7200,
            private_access_secret: "test-private-secret".to_string(),
            private_access_expires_in: 3600,
        },
        pin_hash_cost: MIN_PIN_HASH_COST,
    }
}

pub fn setup() -> TestContext {
    setup_with(|_| {})
}

pub fn setup_with(customize: impl FnOnce(&mut Config)) -> TestContext {
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
    let mut config = test_config(upload_dir.path());
    customize(&mut config);

    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(upload_dir.path(), &config.public_base_url)
            .expect("Failed to create storage"),
    );

    TestContext {
        state: AppState::new(config, store.clone(), storage),
        store,
        upload_dir,
    }
}

/// Seeds an active user whose password is `PASSWORD`.
pub async fn create_user(store: &Arc<dyn Store>, email: &str, storage_limit: f64) -> User {
    let hash = PasswordService::new(4)
        .hash_password(PASSWORD)
        .await
        .expect("Failed to hash password");

    store
        .insert_user(NewUser::new(email, "Test User", hash).with_storage_limit(storage_limit))
        .await
        .expect("Failed to create user")
}

pub async fn used_storage(store: &Arc<dyn Store>, user: &User) -> f64 {
    store
        .find_user(user.id)
        .await
        .expect("Failed to load user")
        .expect("User missing")
        .used_storage
}

/// All regular files below `dir`.
pub fn blobs_in(dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return found;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            found.extend(blobs_in(&path));
        } else {
            found.push(path);
        }
    }
    found
}
