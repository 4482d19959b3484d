use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{
    FileQuery, FileRecord, FolderQuery, FolderRecord, NewFile, NewUser, TypeUsage, User,
    UserStatus,
};

pub mod memory;
pub mod postgres;
pub mod queries;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence seam shared by every service. Each call is one atomic unit:
/// compound operations (quota reserve plus insert, cascade delete plus
/// release) either fully apply or leave nothing behind.
///
/// Ownership is not checked here; services load the row and compare the
/// owner before mutating it.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn insert_user(&self, user: NewUser) -> Result<User>;
    async fn set_logged_in(&self, id: Uuid, logged_in: bool) -> Result<()>;
    async fn set_user_status(&self, id: Uuid, status: UserStatus) -> Result<()>;

    /// Reserves `file.size` against the owner's quota and inserts the row.
    /// Fails with `QuotaExceeded`, `NotFound` or `Forbidden` without writing.
    async fn create_file(&self, file: NewFile) -> Result<FileRecord>;
    async fn find_file(&self, id: Uuid) -> Result<Option<FileRecord>>;
    async fn list_files(&self, user_id: Uuid, query: &FileQuery) -> Result<Vec<FileRecord>>;
    /// Per-type count and size over all of a user's files.
    async fn file_usage_by_type(&self, user_id: Uuid) -> Result<Vec<TypeUsage>>;
    async fn rename_file(&self, id: Uuid, file_name: &str) -> Result<Option<FileRecord>>;
    async fn toggle_file_favorite(&self, id: Uuid) -> Result<Option<FileRecord>>;
    /// Deletes the row and releases its size. Returns the released size, or
    /// `None` if the row was already gone.
    async fn delete_file(&self, id: Uuid) -> Result<Option<f64>>;
    async fn lock_file(&self, id: Uuid, pin_hash: &str) -> Result<Option<FileRecord>>;

    async fn create_folder(&self, user_id: Uuid, folder_name: &str) -> Result<FolderRecord>;
    async fn find_folder(&self, id: Uuid) -> Result<Option<FolderRecord>>;
    async fn list_folders(&self, user_id: Uuid, query: &FolderQuery)
        -> Result<Vec<FolderRecord>>;
    async fn count_folders(&self, user_id: Uuid) -> Result<i64>;
    async fn rename_folder(&self, id: Uuid, folder_name: &str) -> Result<Option<FolderRecord>>;
    /// Deletes the folder with every file in it and releases their combined
    /// size. Returns the released size, or `None` if the folder was gone.
    async fn delete_folder(&self, id: Uuid) -> Result<Option<f64>>;
    async fn lock_folder(&self, id: Uuid, pin_hash: &str) -> Result<Option<FolderRecord>>;

    async fn ping(&self) -> Result<()>;
    async fn close(&self);
}
