use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::queries::{FileQueries, FolderQueries, UserQueries};
use crate::database::Store;
use crate::errors::{AppError, Result};
use crate::models::*;
use crate::services::quota::admission;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        UserQueries::find_by_id(&self.pool, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserQueries::find_by_email(&self.pool, email).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        UserQueries::create_user(&self.pool, &user).await
    }

    async fn set_logged_in(&self, id: Uuid, logged_in: bool) -> Result<()> {
        UserQueries::set_logged_in(&self.pool, id, logged_in).await
    }

    async fn set_user_status(&self, id: Uuid, status: UserStatus) -> Result<()> {
        UserQueries::set_status(&self.pool, id, status).await
    }

    async fn create_file(&self, file: NewFile) -> Result<FileRecord> {
        let mut tx = self.pool.begin().await?;

        if !UserQueries::reserve_storage(&mut *tx, file.user_id, file.size).await? {
            tx.rollback().await?;
            // Explain the refusal; if the policy now admits the size, a
            // concurrent writer took the remaining room in between.
            let user = UserQueries::find_by_id(&self.pool, file.user_id).await?;
            admission(user.as_ref(), file.size)?;
            debug!(user_id = %file.user_id, "Lost quota race");
            return Err(AppError::QuotaExceeded);
        }

        let record = FileQueries::insert(&mut *tx, &file).await?;
        tx.commit().await?;

        Ok(record)
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<FileRecord>> {
        FileQueries::find_by_id(&self.pool, id).await
    }

    async fn list_files(&self, user_id: Uuid, query: &FileQuery) -> Result<Vec<FileRecord>> {
        FileQueries::list(&self.pool, user_id, query).await
    }

    async fn file_usage_by_type(&self, user_id: Uuid) -> Result<Vec<TypeUsage>> {
        FileQueries::usage_by_type(&self.pool, user_id).await
    }

    async fn rename_file(&self, id: Uuid, file_name: &str) -> Result<Option<FileRecord>> {
        FileQueries::rename(&self.pool, id, file_name).await
    }

    async fn toggle_file_favorite(&self, id: Uuid) -> Result<Option<FileRecord>> {
        FileQueries::toggle_favorite(&self.pool, id).await
    }

    async fn delete_file(&self, id: Uuid) -> Result<Option<f64>> {
        let mut tx = self.pool.begin().await?;

        let Some((user_id, size)) = FileQueries::delete(&mut *tx, id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        UserQueries::release_storage(&mut *tx, user_id, size).await?;
        tx.commit().await?;

        Ok(Some(size))
    }

    async fn lock_file(&self, id: Uuid, pin_hash: &str) -> Result<Option<FileRecord>> {
        FileQueries::lock(&self.pool, id, pin_hash).await
    }

    async fn create_folder(&self, user_id: Uuid, folder_name: &str) -> Result<FolderRecord> {
        FolderQueries::insert(&self.pool, user_id, folder_name).await
    }

    async fn find_folder(&self, id: Uuid) -> Result<Option<FolderRecord>> {
        FolderQueries::find_by_id(&self.pool, id).await
    }

    async fn list_folders(
        &self,
        user_id: Uuid,
        query: &FolderQuery,
    ) -> Result<Vec<FolderRecord>> {
        FolderQueries::list(&self.pool, user_id, query).await
    }

    async fn count_folders(&self, user_id: Uuid) -> Result<i64> {
        FolderQueries::count(&self.pool, user_id).await
    }

    async fn rename_folder(&self, id: Uuid, folder_name: &str) -> Result<Option<FolderRecord>> {
        FolderQueries::rename(&self.pool, id, folder_name).await
    }

    async fn delete_folder(&self, id: Uuid) -> Result<Option<f64>> {
        let mut tx = self.pool.begin().await?;

        let released = FileQueries::delete_in_folder(&mut *tx, id).await?;
        let Some(user_id) = FolderQueries::delete(&mut *tx, id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        UserQueries::release_storage(&mut *tx, user_id, released).await?;
        tx.commit().await?;

        Ok(Some(released))
    }

    async fn lock_folder(&self, id: Uuid, pin_hash: &str) -> Result<Option<FolderRecord>> {
        FolderQueries::lock(&self.pool, id, pin_hash).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
