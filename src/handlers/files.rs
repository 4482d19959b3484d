use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    errors::{AppError, Result},
    handlers::AppState,
    middleware::AuthenticatedUser,
    models::{ByDateQuery, FileType, RenameFileRequest, UploadResponse, UploadedFile},
};

pub async fn storage(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    let status = state.files.storage_status(user.id).await?;

    Ok(Json(json!({
        "message": "Storage information retrieved successfully",
        "data": status
    })))
}

pub async fn storage_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    let summary = state.files.storage_summary(user.id).await?;

    Ok(Json(json!({
        "message": "Storage summary retrieved successfully",
        "data": summary
    })))
}

pub async fn upload(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut folder_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("untitled").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;
                file = Some((file_name, content_type, data.to_vec()));
            }
            "folderId" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid folderId: {}", e)))?;
                let value = value.trim();
                if !value.is_empty() {
                    folder_id = Some(
                        Uuid::parse_str(value)
                            .map_err(|_| AppError::BadRequest("Invalid folderId".to_string()))?,
                    );
                }
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    if data.len() > state.config.max_file_size {
        return Err(AppError::BadRequest(format!(
            "File exceeds the maximum size of {} bytes",
            state.config.max_file_size
        )));
    }

    let record = state
        .files
        .upload(
            user.id,
            UploadedFile {
                file_name,
                content_type,
                data,
                folder_id,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "File uploaded successfully",
            "data": UploadResponse::from(record)
        })),
    ))
}

async fn list_of_type(
    state: &AppState,
    user: &AuthenticatedUser,
    file_type: FileType,
) -> Result<Json<serde_json::Value>> {
    let files = state.files.list_by_type(user.id, file_type).await?;

    Ok(Json(json!({
        "message": format!("{} files retrieved successfully", file_type),
        "data": files
    })))
}

pub async fn note_files(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    list_of_type(&state, &user, FileType::Note).await
}

pub async fn image_files(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    list_of_type(&state, &user, FileType::Image).await
}

pub async fn pdf_files(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    list_of_type(&state, &user, FileType::Pdf).await
}

pub async fn recent(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    let files = state.files.recent(user.id).await?;

    Ok(Json(json!({
        "message": "Recent files retrieved successfully",
        "data": files
    })))
}

pub async fn by_date(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ByDateQuery>,
) -> Result<Json<serde_json::Value>> {
    let result = state.files.by_date(user.id, &query.date).await?;

    Ok(Json(json!({
        "message": "Files and folders retrieved successfully",
        "data": result
    })))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(file_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let file = state.files.toggle_favorite(file_id, user.id).await?;

    Ok(Json(json!({
        "message": "Favorite status updated",
        "data": file
    })))
}

pub async fn rename(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(file_id): Path<Uuid>,
    Json(request): Json<RenameFileRequest>,
) -> Result<Json<serde_json::Value>> {
    let file = state
        .files
        .rename(file_id, user.id, &request.file_name)
        .await?;

    Ok(Json(json!({
        "message": "File renamed successfully",
        "data": file
    })))
}

pub async fn duplicate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(file_id): Path<Uuid>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let file = state.files.duplicate(file_id, user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "File duplicated successfully",
            "data": file
        })),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(file_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    state.files.delete(file_id, user.id).await?;

    Ok(Json(json!({
        "message": "File deleted successfully",
        "data": null
    })))
}
