use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::FileRecord;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub folder_name: String,
    pub is_private: bool,
    #[serde(skip_serializing)]
    pub pin_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct FolderQuery {
    pub created_within: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl FolderQuery {
    pub fn created_within(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            created_within: Some((start, end)),
        }
    }

    /// Private folders never match; listings only ever show public rows.
    pub fn matches(&self, folder: &FolderRecord) -> bool {
        if folder.is_private {
            return false;
        }
        match self.created_within {
            Some((start, end)) => folder.created_at >= start && folder.created_at < end,
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNameRequest {
    pub folder_name: String,
}

impl FolderNameRequest {
    pub fn validated_name(&self) -> Result<&str> {
        let name = self.folder_name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Folder name is required".to_string()));
        }
        Ok(name)
    }
}

#[derive(Debug, Serialize)]
pub struct FolderWithFiles {
    #[serde(flatten)]
    pub folder: FolderRecord,
    pub files: Vec<FileRecord>,
}
