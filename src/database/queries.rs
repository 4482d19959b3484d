use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::*;

pub struct UserQueries;

impl UserQueries {
    pub async fn create_user<'e, E: PgExecutor<'e>>(executor: E, user: &NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, full_name, password_hash, role, status, storage_limit)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(user.storage_limit)
        .fetch_one(executor)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("Email already registered".to_string())
            }
            other => AppError::Database(other),
        })?;

        Ok(user)
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email<'e, E: PgExecutor<'e>>(
        executor: E,
        email: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    pub async fn set_logged_in<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        logged_in: bool,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET is_logged_in = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(logged_in)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn set_status<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        status: UserStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Conditional increment: only applies when the user is active and the
    /// new total still fits the limit. Returns whether a row was updated.
    pub async fn reserve_storage<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        size: f64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET used_storage = used_storage + $2, updated_at = NOW()
            WHERE id = $1
              AND status = 'ACTIVE'
              AND used_storage + $2 <= storage_limit
            "#,
        )
        .bind(id)
        .bind(size)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn release_storage<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        size: f64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET used_storage = GREATEST(used_storage - $2, 0), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(size)
        .execute(executor)
        .await?;

        Ok(())
    }
}

pub struct FileQueries;

impl FileQueries {
    pub async fn insert<'e, E: PgExecutor<'e>>(executor: E, file: &NewFile) -> Result<FileRecord> {
        let file = sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files (id, user_id, file_name, file_type, size, file_url, is_favorite, folder_id, is_private, pin_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(file.user_id)
        .bind(&file.file_name)
        .bind(file.file_type.as_str())
        .bind(file.size)
        .bind(&file.file_url)
        .bind(file.is_favorite)
        .bind(file.folder_id)
        .bind(file.is_private)
        .bind(&file.pin_hash)
        .fetch_one(executor)
        .await?;

        Ok(file)
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(file)
    }

    pub async fn list<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        query: &FileQuery,
    ) -> Result<Vec<FileRecord>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM files WHERE user_id = ");
        builder.push_bind(user_id);

        if !query.include_private {
            builder.push(" AND is_private = FALSE");
        }
        if let Some(file_type) = query.file_type {
            builder.push(" AND file_type = ").push_bind(file_type.as_str());
        }
        if let Some(folder_id) = query.folder_id {
            builder.push(" AND folder_id = ").push_bind(folder_id);
        }
        if let Some((start, end)) = query.created_within {
            builder
                .push(" AND created_at >= ")
                .push_bind(start)
                .push(" AND created_at < ")
                .push_bind(end);
        }

        builder.push(" ORDER BY created_at DESC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let files = builder
            .build_query_as::<FileRecord>()
            .fetch_all(executor)
            .await?;

        Ok(files)
    }

    pub async fn usage_by_type<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<TypeUsage>> {
        let rows = sqlx::query_as::<_, TypeUsage>(
            r#"
            SELECT file_type, COUNT(*) AS count, COALESCE(SUM(size), 0) AS total_size
            FROM files
            WHERE user_id = $1
            GROUP BY file_type
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn rename<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        file_name: &str,
    ) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(
            "UPDATE files SET file_name = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(file_name)
        .fetch_optional(executor)
        .await?;

        Ok(file)
    }

    pub async fn toggle_favorite<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(
            "UPDATE files SET is_favorite = NOT is_favorite WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(file)
    }

    pub async fn lock<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        pin_hash: &str,
    ) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(
            "UPDATE files SET is_private = TRUE, pin_hash = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(pin_hash)
        .fetch_optional(executor)
        .await?;

        Ok(file)
    }

    /// Returns the owner and size of the deleted row.
    pub async fn delete<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<(Uuid, f64)>> {
        let row = sqlx::query_as::<_, (Uuid, f64)>(
            "DELETE FROM files WHERE id = $1 RETURNING user_id, size",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(row)
    }

    /// Deletes every file in a folder, returning the total size removed.
    pub async fn delete_in_folder<'e, E: PgExecutor<'e>>(
        executor: E,
        folder_id: Uuid,
    ) -> Result<f64> {
        let sizes = sqlx::query_scalar::<_, f64>(
            "DELETE FROM files WHERE folder_id = $1 RETURNING size",
        )
        .bind(folder_id)
        .fetch_all(executor)
        .await?;

        Ok(sizes.into_iter().sum())
    }
}

pub struct FolderQueries;

impl FolderQueries {
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        folder_name: &str,
    ) -> Result<FolderRecord> {
        let folder = sqlx::query_as::<_, FolderRecord>(
            r#"
            INSERT INTO folders (id, user_id, folder_name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(folder_name)
        .fetch_one(executor)
        .await?;

        Ok(folder)
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<FolderRecord>> {
        let folder = sqlx::query_as::<_, FolderRecord>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(folder)
    }

    pub async fn list<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        query: &FolderQuery,
    ) -> Result<Vec<FolderRecord>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT * FROM folders WHERE is_private = FALSE AND user_id = ",
        );
        builder.push_bind(user_id);

        if let Some((start, end)) = query.created_within {
            builder
                .push(" AND created_at >= ")
                .push_bind(start)
                .push(" AND created_at < ")
                .push_bind(end);
        }
        builder.push(" ORDER BY created_at DESC");

        let folders = builder
            .build_query_as::<FolderRecord>()
            .fetch_all(executor)
            .await?;

        Ok(folders)
    }

    pub async fn count<'e, E: PgExecutor<'e>>(executor: E, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM folders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    pub async fn rename<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        folder_name: &str,
    ) -> Result<Option<FolderRecord>> {
        let folder = sqlx::query_as::<_, FolderRecord>(
            "UPDATE folders SET folder_name = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(folder_name)
        .fetch_optional(executor)
        .await?;

        Ok(folder)
    }

    pub async fn lock<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        pin_hash: &str,
    ) -> Result<Option<FolderRecord>> {
        let folder = sqlx::query_as::<_, FolderRecord>(
            "UPDATE folders SET is_private = TRUE, pin_hash = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(pin_hash)
        .fetch_optional(executor)
        .await?;

        Ok(folder)
    }

    /// Returns the owner of the deleted folder.
    pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<Uuid>> {
        let owner = sqlx::query_scalar::<_, Uuid>("DELETE FROM folders WHERE id = $1 RETURNING user_id")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(owner)
    }
}
