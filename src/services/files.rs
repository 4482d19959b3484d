use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::Store;
use crate::errors::{AppError, Result};
use crate::models::*;
use crate::services::quota::QuotaLedger;
use crate::storage::{blob_key, Storage};

/// Number of entries returned by the recent-files listing.
pub const RECENT_FILES_LIMIT: i64 = 10;

/// Lifecycle of file rows: upload, listing, rename, favorite, duplicate and
/// delete, with every size change going through the quota ledger.
#[derive(Clone)]
pub struct FileService {
    store: Arc<dyn Store>,
    storage: Arc<dyn Storage>,
    ledger: QuotaLedger,
}

impl FileService {
    pub fn new(store: Arc<dyn Store>, storage: Arc<dyn Storage>) -> Self {
        Self {
            ledger: QuotaLedger::new(store.clone()),
            store,
            storage,
        }
    }

    /// Stores the uploaded bytes and records them. The blob is removed again
    /// if the row cannot be created.
    pub async fn upload(&self, user_id: Uuid, upload: UploadedFile) -> Result<FileRecord> {
        if upload.file_name.trim().is_empty() {
            return Err(AppError::BadRequest("File name is required".to_string()));
        }
        if let Some(folder_id) = upload.folder_id {
            self.owned_folder(folder_id, user_id).await?;
        }

        let size = upload.size_in_gb();
        self.ledger.admit(user_id, size).await?;

        let file_type = FileType::from_mime(&upload.content_type);
        let key = blob_key(user_id, &upload.file_name, &upload.content_type);
        self.storage.store(&key, &upload.data).await?;

        let new_file = NewFile::new(
            user_id,
            upload.file_name,
            file_type,
            size,
            self.storage.public_url(&key),
        )
        .in_folder(upload.folder_id);

        match self.create(user_id, new_file).await {
            Ok(file) => Ok(file),
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&key).await {
                    warn!(%key, "Failed to remove orphaned blob: {}", cleanup);
                }
                Err(e)
            }
        }
    }

    /// Admits and inserts a file row for `user_id` in one atomic step.
    pub async fn create(&self, user_id: Uuid, mut file: NewFile) -> Result<FileRecord> {
        file.user_id = user_id;
        file.validate()?;
        if let Some(folder_id) = file.folder_id {
            self.owned_folder(folder_id, user_id).await?;
        }

        let record = self.store.create_file(file).await.map_err(|e| {
            if matches!(e, AppError::QuotaExceeded) {
                warn!(%user_id, "File rejected: storage quota exceeded");
            }
            e
        })?;

        info!(
            file_id = %record.id,
            %user_id,
            size = record.size,
            file_type = %record.file_type,
            "File created"
        );
        Ok(record)
    }

    pub async fn list_by_type(&self, user_id: Uuid, file_type: FileType) -> Result<Vec<FileRecord>> {
        self.store
            .list_files(user_id, &FileQuery::of_type(file_type))
            .await
    }

    pub async fn recent(&self, user_id: Uuid) -> Result<Vec<FileRecord>> {
        self.store
            .list_files(user_id, &FileQuery::recent(RECENT_FILES_LIMIT))
            .await
    }

    /// Public files and folders created on the given UTC calendar day.
    pub async fn by_date(&self, user_id: Uuid, date: &str) -> Result<ByDateResponse> {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            AppError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string())
        })?;
        let start = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::BadRequest("Invalid date".to_string()))?
            .and_utc();
        let end = start + Duration::days(1);

        let files = self
            .store
            .list_files(user_id, &FileQuery::created_within(start, end))
            .await?;
        let folders = self
            .store
            .list_folders(user_id, &FolderQuery::created_within(start, end))
            .await?;

        Ok(ByDateResponse {
            date: day.format("%Y-%m-%d").to_string(),
            files,
            folders,
        })
    }

    pub async fn rename(&self, file_id: Uuid, user_id: Uuid, file_name: &str) -> Result<FileRecord> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(AppError::BadRequest("File name is required".to_string()));
        }

        self.owned_file(file_id, user_id).await?;
        self.store
            .rename_file(file_id, file_name)
            .await?
            .ok_or_else(|| AppError::NotFound("File".to_string()))
    }

    pub async fn toggle_favorite(&self, file_id: Uuid, user_id: Uuid) -> Result<FileRecord> {
        self.owned_file(file_id, user_id).await?;
        self.store
            .toggle_file_favorite(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File".to_string()))
    }

    /// Inserts a copy named `"<name> - Copy"`. The copy is admitted against
    /// the quota on its own.
    pub async fn duplicate(&self, file_id: Uuid, user_id: Uuid) -> Result<FileRecord> {
        let original = self.owned_file(file_id, user_id).await?;
        let copy = self.create(user_id, NewFile::duplicate_of(&original)).await?;

        info!(original_id = %file_id, copy_id = %copy.id, "File duplicated");
        Ok(copy)
    }

    /// Deletes a file row and returns the size released from the quota.
    pub async fn delete(&self, file_id: Uuid, user_id: Uuid) -> Result<f64> {
        self.owned_file(file_id, user_id).await?;
        let released = self
            .store
            .delete_file(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File".to_string()))?;

        info!(%file_id, %user_id, released, "File deleted");
        Ok(released)
    }

    pub async fn storage_status(&self, user_id: Uuid) -> Result<StorageStatus> {
        self.ledger.status(user_id).await
    }

    pub async fn storage_summary(&self, user_id: Uuid) -> Result<StorageSummary> {
        let status = self.ledger.status(user_id).await?;
        let usage = self.store.file_usage_by_type(user_id).await?;
        let folder_count = self.store.count_folders(user_id).await?;

        let mut files = FileTypeBreakdown::default();
        for row in usage {
            files.record(row.file_type, row.count, row.total_size);
        }

        Ok(StorageSummary {
            storage: status.into(),
            folders: FolderTotals {
                total: folder_count,
            },
            files,
        })
    }

    async fn owned_file(&self, file_id: Uuid, user_id: Uuid) -> Result<FileRecord> {
        let file = self
            .store
            .find_file(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File".to_string()))?;

        if file.user_id != user_id {
            return Err(AppError::Forbidden(
                "You do not have access to this file".to_string(),
            ));
        }
        Ok(file)
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
