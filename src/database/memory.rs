use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::Store;
use crate::errors::{AppError, Result};
use crate::models::*;
use crate::services::quota::admission;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    // Insertion order breaks ties between equal timestamps.
    files: Vec<FileRecord>,
    folders: Vec<FolderRecord>,
}

impl Tables {
    fn file_mut(&mut self, id: Uuid) -> Option<&mut FileRecord> {
        self.files.iter_mut().find(|f| f.id == id)
    }

    fn folder_mut(&mut self, id: Uuid) -> Option<&mut FolderRecord> {
        self.folders.iter_mut().find(|f| f.id == id)
    }

    fn release(&mut self, user_id: Uuid, size: f64) {
        if let Some(user) = self.users.get_mut(&user_id) {
            user.used_storage = (user.used_storage - size).max(0.0);
            user.updated_at = Utc::now();
        }
    }
}

/// In-process store for development and tests. Every call holds the single
/// table lock for its whole duration, which makes each one atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    rows.reverse();
    rows.sort_by_key(|row| Reverse(created_at(row)));
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            email: user.email,
            full_name: user.full_name,
            password_hash: user.password_hash,
            role: user.role,
            status: user.status,
            is_logged_in: false,
            storage_limit: user.storage_limit,
            used_storage: 0.0,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn set_logged_in(&self, id: Uuid, logged_in: bool) -> Result<()> {
        if let Some(user) = self.tables.lock().await.users.get_mut(&id) {
            user.is_logged_in = logged_in;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_user_status(&self, id: Uuid, status: UserStatus) -> Result<()> {
        if let Some(user) = self.tables.lock().await.users.get_mut(&id) {
            user.status = status;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn create_file(&self, file: NewFile) -> Result<FileRecord> {
        let mut tables = self.tables.lock().await;
        admission(tables.users.get(&file.user_id), file.size)?;

        if let Some(user) = tables.users.get_mut(&file.user_id) {
            user.used_storage += file.size;
            user.updated_at = Utc::now();
        }

        let record = FileRecord {
            id: Uuid::new_v4(),
            user_id: file.user_id,
            file_name: file.file_name,
            file_type: file.file_type,
            size: file.size,
            file_url: file.file_url,
            is_favorite: file.is_favorite,
            folder_id: file.folder_id,
            is_private: file.is_private,
            pin_hash: file.pin_hash,
            created_at: Utc::now(),
        };
        tables.files.push(record.clone());
        Ok(record)
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<FileRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables.files.iter().find(|f| f.id == id).cloned())
    }

    async fn list_files(&self, user_id: Uuid, query: &FileQuery) -> Result<Vec<FileRecord>> {
        let tables = self.tables.lock().await;
        let rows: Vec<FileRecord> = tables
            .files
            .iter()
            .filter(|f| f.user_id == user_id && query.matches(f))
            .cloned()
            .collect();

        let mut rows = newest_first(rows, |f| f.created_at);
        if let Some(limit) = query.limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn file_usage_by_type(&self, user_id: Uuid) -> Result<Vec<TypeUsage>> {
        let tables = self.tables.lock().await;
        let mut usage: HashMap<FileType, (i64, f64)> = HashMap::new();
        for file in tables.files.iter().filter(|f| f.user_id == user_id) {
            let entry = usage.entry(file.file_type).or_default();
            entry.0 += 1;
            entry.1 += file.size;
        }

        Ok(usage
            .into_iter()
            .map(|(file_type, (count, total_size))| TypeUsage {
                file_type,
                count,
                total_size,
            })
            .collect())
    }

    async fn rename_file(&self, id: Uuid, file_name: &str) -> Result<Option<FileRecord>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.file_mut(id).map(|file| {
            file.file_name = file_name.to_string();
            file.clone()
        }))
    }

    async fn toggle_file_favorite(&self, id: Uuid) -> Result<Option<FileRecord>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.file_mut(id).map(|file| {
            file.is_favorite = !file.is_favorite;
            file.clone()
        }))
    }

    async fn delete_file(&self, id: Uuid) -> Result<Option<f64>> {
        let mut tables = self.tables.lock().await;
        let Some(index) = tables.files.iter().position(|f| f.id == id) else {
            return Ok(None);
        };

        let file = tables.files.remove(index);
        tables.release(file.user_id, file.size);
        Ok(Some(file.size))
    }

    async fn lock_file(&self, id: Uuid, pin_hash: &str) -> Result<Option<FileRecord>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.file_mut(id).map(|file| {
            file.is_private = true;
            file.pin_hash = Some(pin_hash.to_string());
            file.clone()
        }))
    }

    async fn create_folder(&self, user_id: Uuid, folder_name: &str) -> Result<FolderRecord> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::NotFound("User".to_string()));
        }

        let record = FolderRecord {
            id: Uuid::new_v4(),
            user_id,
            folder_name: folder_name.to_string(),
            is_private: false,
            pin_hash: None,
            created_at: Utc::now(),
        };
        tables.folders.push(record.clone());
        Ok(record)
    }

    async fn find_folder(&self, id: Uuid) -> Result<Option<FolderRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables.folders.iter().find(|f| f.id == id).cloned())
    }

    async fn list_folders(
        &self,
        user_id: Uuid,
        query: &FolderQuery,
    ) -> Result<Vec<FolderRecord>> {
        let tables = self.tables.lock().await;
        let rows: Vec<FolderRecord> = tables
            .folders
            .iter()
            .filter(|f| f.user_id == user_id && query.matches(f))
            .cloned()
            .collect();

        Ok(newest_first(rows, |f| f.created_at))
    }

    async fn count_folders(&self, user_id: Uuid) -> Result<i64> {
        let tables = self.tables.lock().await;
        Ok(tables.folders.iter().filter(|f| f.user_id == user_id).count() as i64)
    }

    async fn rename_folder(&self, id: Uuid, folder_name: &str) -> Result<Option<FolderRecord>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.folder_mut(id).map(|folder| {
            folder.folder_name = folder_name.to_string();
            folder.clone()
        }))
    }

    async fn delete_folder(&self, id: Uuid) -> Result<Option<f64>> {
        let mut tables = self.tables.lock().await;
        let Some(index) = tables.folders.iter().position(|f| f.id == id) else {
            return Ok(None);
        };

        let folder = tables.folders.remove(index);
        let released: f64 = tables
            .files
            .iter()
            .filter(|f| f.folder_id == Some(id))
            .map(|f| f.size)
            .sum();
        tables.files.retain(|f| f.folder_id != Some(id));
        tables.release(folder.user_id, released);

        Ok(Some(released))
    }

    async fn lock_folder(&self, id: Uuid, pin_hash: &str) -> Result<Option<FolderRecord>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.folder_mut(id).map(|folder| {
            folder.is_private = true;
            folder.pin_hash = Some(pin_hash.to_string());
            folder.clone()
        }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) {}
}
