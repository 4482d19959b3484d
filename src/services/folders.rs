use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::database::Store;
use crate::errors::{AppError, Result};
use crate::models::*;

#[derive(Clone)]
pub struct FolderService {
    store: Arc<dyn Store>,
}

impl FolderService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, user_id: Uuid, folder_name: &str) -> Result<FolderRecord> {
        let folder_name = folder_name.trim();
        if folder_name.is_empty() {
            return Err(AppError::BadRequest("Folder name is required".to_string()));
        }

        let folder = self.store.create_folder(user_id, folder_name).await?;
        info!(folder_id = %folder.id, %user_id, "Folder created");
        Ok(folder)
    }

    /// Public folders, newest first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<FolderRecord>> {
        self.store
            .list_folders(user_id, &FolderQuery::default())
            .await
    }

    /// A public folder with its public files. Private folders are only
    /// reachable through the privacy gate.
    pub async fn get(&self, user_id: Uuid, folder_id: Uuid) -> Result<FolderWithFiles> {
        let folder = self
            .store
            .find_folder(folder_id)
            .await?
            .filter(|folder| folder.user_id == user_id && !folder.is_private)
            .ok_or_else(|| AppError::NotFound("Folder".to_string()))?;

        let files = self
            .store
            .list_files(user_id, &FileQuery::in_folder(folder_id))
            .await?;

        Ok(FolderWithFiles { folder, files })
    }

    pub async fn rename(
        &self,
        folder_id: Uuid,
        user_id: Uuid,
        folder_name: &str,
    ) -> Result<FolderRecord> {
        let folder_name = folder_name.trim();
        if folder_name.is_empty() {
            return Err(AppError::BadRequest("Folder name is required".to_string()));
        }

        self.owned_folder(folder_id, user_id).await?;
        self.store
            .rename_folder(folder_id, folder_name)
            .await?
            .ok_or_else(|| AppError::NotFound("Folder".to_string()))
    }

    /// Deletes the folder and its files, returning the size released.
    pub async fn delete(&self, folder_id: Uuid, user_id: Uuid) -> Result<f64> {
        self.owned_folder(folder_id, user_id).await?;
        let released = self
            .store
            .delete_folder(folder_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Folder".to_string()))?;

        info!(%folder_id, %user_id, released, "Folder deleted");
        Ok(released)
    }

    async fn owned_folder(&self, folder_id: Uuid, user_id: Uuid) -> Result<FolderRecord> {
        let folder = self
            .store
            .find_folder(folder_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Folder".to_string()))?;

        if folder.user_id != user_id {
            return Err(AppError::Forbidden(
                "You do not have access to this folder".to_string(),
            ));
        }
        Ok(folder)
    }
}
