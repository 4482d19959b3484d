use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{AppError, Result};

pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

const IMAGE_SUBTYPES: &[&str] = &["jpeg", "jpg", "png", "gif", "webp", "svg+xml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Note,
    Image,
    Pdf,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Note => "note",
            FileType::Image => "image",
            FileType::Pdf => "pdf",
        }
    }

    /// Classifies a declared MIME type. Anything that is neither a known
    /// image type nor a PDF is treated as a note.
    pub fn from_mime(content_type: &str) -> Self {
        let Ok(parsed) = content_type.parse::<mime::Mime>() else {
            return FileType::Note;
        };

        if parsed.type_() == mime::APPLICATION && parsed.subtype() == mime::PDF {
            return FileType::Pdf;
        }

        if parsed.type_() == mime::IMAGE {
            let subtype = match parsed.suffix() {
                Some(suffix) => format!("{}+{}", parsed.subtype(), suffix),
                None => parsed.subtype().to_string(),
            };
            if IMAGE_SUBTYPES.contains(&subtype.as_str()) {
                return FileType::Image;
            }
        }

        FileType::Note
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "note" => Ok(FileType::Note),
            "image" => Ok(FileType::Image),
            "pdf" => Ok(FileType::Pdf),
            _ => Err(format!("unknown file type: {s}")),
        }
    }
}

impl TryFrom<String> for FileType {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    #[sqlx(try_from = "String")]
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Gigabytes.
    pub size: f64,
    pub file_url: String,
    pub is_favorite: bool,
    pub folder_id: Option<Uuid>,
    pub is_private: bool,
    #[serde(skip_serializing)]
    pub pin_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a file row. Size is in gigabytes.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub user_id: Uuid,
    pub file_name: String,
    pub file_type: FileType,
    pub size: f64,
    pub file_url: String,
    pub is_favorite: bool,
    pub folder_id: Option<Uuid>,
    pub is_private: bool,
    pub pin_hash: Option<String>,
}

impl NewFile {
    pub fn new(
        user_id: Uuid,
        file_name: impl Into<String>,
        file_type: FileType,
        size: f64,
        file_url: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            file_name: file_name.into(),
            file_type,
            size,
            file_url: file_url.into(),
            is_favorite: false,
            folder_id: None,
            is_private: false,
            pin_hash: None,
        }
    }

    pub fn in_folder(mut self, folder_id: Option<Uuid>) -> Self {
        self.folder_id = folder_id;
        self
    }

    /// A copy of an existing row under the `"<name> - Copy"` name.
    pub fn duplicate_of(file: &FileRecord) -> Self {
        Self {
            user_id: file.user_id,
            file_name: format!("{} - Copy", file.file_name),
            file_type: file.file_type,
            size: file.size,
            file_url: file.file_url.clone(),
            is_favorite: file.is_favorite,
            folder_id: file.folder_id,
            is_private: file.is_private,
            pin_hash: file.pin_hash.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(AppError::BadRequest("File name is required".to_string()));
        }
        if !self.size.is_finite() || self.size < 0.0 {
            return Err(AppError::BadRequest("File size must be a non-negative number".to_string()));
        }
        Ok(())
    }
}

/// Filter for file listings. Private rows are excluded unless
/// `include_private` is set, which only the privacy gate does.
#[derive(Debug, Clone, Default)]
pub struct FileQuery {
    pub file_type: Option<FileType>,
    pub folder_id: Option<Uuid>,
    pub created_within: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub limit: Option<i64>,
    pub include_private: bool,
}

impl FileQuery {
    pub fn of_type(file_type: FileType) -> Self {
        Self {
            file_type: Some(file_type),
            ..Self::default()
        }
    }

    pub fn recent(limit: i64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn in_folder(folder_id: Uuid) -> Self {
        Self {
            folder_id: Some(folder_id),
            ..Self::default()
        }
    }

    pub fn created_within(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            created_within: Some((start, end)),
            ..Self::default()
        }
    }

    /// Whether a row passes this filter; used by the in-memory store.
    pub fn matches(&self, file: &FileRecord) -> bool {
        if file.is_private && !self.include_private {
            return false;
        }
        if let Some(file_type) = self.file_type {
            if file.file_type != file_type {
                return false;
            }
        }
        if let Some(folder_id) = self.folder_id {
            if file.folder_id != Some(folder_id) {
                return false;
            }
        }
        if let Some((start, end)) = self.created_within {
            if file.created_at < start || file.created_at >= end {
                return false;
            }
        }
        true
    }
}

/// Per-type aggregate row: `GROUP BY file_type`.
#[derive(Debug, Clone, FromRow)]
pub struct TypeUsage {
    #[sqlx(try_from = "String")]
    pub file_type: FileType,
    pub count: i64,
    pub total_size: f64,
}

/// Binary content handed over by the upload transport.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub folder_id: Option<Uuid>,
}

impl UploadedFile {
    pub fn size_in_gb(&self) -> f64 {
        self.data.len() as f64 / BYTES_PER_GB
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: Uuid,
    pub file_name: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub size: f64,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<FileRecord> for UploadResponse {
    fn from(file: FileRecord) -> Self {
        Self {
            id: file.id,
            file_name: file.file_name,
            file_type: file.file_type,
            size: file.size,
            file_url: file.file_url,
            created_at: file.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFileRequest {
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ByDateQuery {
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_classification() {
        assert_eq!(FileType::from_mime("application/pdf"), FileType::Pdf);
        assert_eq!(FileType::from_mime("image/png"), FileType::Image);
        assert_eq!(FileType::from_mime("image/jpg"), FileType::Image);
        assert_eq!(FileType::from_mime("image/svg+xml"), FileType::Image);
        assert_eq!(FileType::from_mime("image/tiff"), FileType::Note);
        assert_eq!(FileType::from_mime("text/plain; charset=utf-8"), FileType::Note);
        assert_eq!(FileType::from_mime("not a mime"), FileType::Note);
    }

    #[test]
    fn test_duplicate_keeps_content_fields() {
        let now = Utc::now();
        let original = FileRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            file_name: "report.pdf".to_string(),
            file_type: FileType::Pdf,
            size: 0.25,
            file_url: "http://localhost/uploads/report.pdf".to_string(),
            is_favorite: true,
            folder_id: None,
            is_private: false,
            pin_hash: None,
            created_at: now,
        };

        let copy = NewFile::duplicate_of(&original);
        assert_eq!(copy.file_name, "report.pdf - Copy");
        assert_eq!(copy.size, original.size);
        assert_eq!(copy.file_type, original.file_type);
        assert_eq!(copy.file_url, original.file_url);
    }

    #[test]
    fn test_query_hides_private_rows() {
        let file = FileRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            file_name: "secret.txt".to_string(),
            file_type: FileType::Note,
            size: 0.001,
            file_url: String::new(),
            is_favorite: false,
            folder_id: None,
            is_private: true,
            pin_hash: Some("hash".to_string()),
            created_at: Utc::now(),
        };

        assert!(!FileQuery::default().matches(&file));
        assert!(!FileQuery::of_type(FileType::Note).matches(&file));
        let unlocked = FileQuery {
            include_private: true,
            ..FileQuery::default()
        };
        assert!(unlocked.matches(&file));
    }
}
