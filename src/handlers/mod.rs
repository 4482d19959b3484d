use std::sync::Arc;

use crate::{
    auth::{PasswordService, TokenService},
    config::Config,
    database::Store,
    services::{AuthService, FileService, FolderService, PrivacyGate},
    storage::Storage,
};

pub mod auth;
pub mod files;
pub mod folders;
pub mod health;
pub mod privacy;

/// Shared request state. The store handle is created once at startup and
/// every service holds a clone of it.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub auth: AuthService,
    pub files: FileService,
    pub folders: FolderService,
    pub privacy: PrivacyGate,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, storage: Arc<dyn Storage>) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt));
        let passwords = PasswordService::new(config.pin_hash_cost);

        Self {
            auth: AuthService::new(store.clone(), tokens.clone(), passwords),
            files: FileService::new(store.clone(), storage),
            folders: FolderService::new(store.clone()),
            privacy: PrivacyGate::new(store.clone(), tokens, passwords),
            store,
            config,
        }
    }
}
