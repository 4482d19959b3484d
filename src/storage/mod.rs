use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

use crate::errors::Result;

pub mod local;

pub use local::LocalStorage;

/// Blob storage for uploaded bytes. Keys are relative, `/`-separated paths.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn store(&self, key: &str, data: &[u8]) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// URL under which the stored blob is served.
    fn public_url(&self, key: &str) -> String;
}

/// Builds `<user>/<yyyy>/<mm>/<dd>/<uuid>.<ext>` for a new upload.
pub fn blob_key(user_id: Uuid, file_name: &str, content_type: &str) -> String {
    let date_dir = Utc::now().format("%Y/%m/%d");
    format!(
        "{}/{}/{}.{}",
        user_id,
        date_dir,
        Uuid::new_v4(),
        file_extension(file_name, content_type)
    )
}

fn file_extension(file_name: &str, content_type: &str) -> String {
    let from_name = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    if let Some(ext) = from_name {
        return ext.to_ascii_lowercase();
    }

    mime_guess::get_mime_extensions_str(content_type)
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_key_layout() {
        let user_id = Uuid::new_v4();
        let key = blob_key(user_id, "Report.PDF", "application/pdf");

        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], user_id.to_string());
        assert_eq!(parts[1].len(), 4);
        assert!(parts[4].ends_with(".pdf"));
    }

    #[test]
    fn test_extension_fallbacks() {
        assert_eq!(file_extension("notes", "application/pdf"), "pdf");
        assert_eq!(file_extension("../../etc/passwd", "application/x-unknown-thing"), "bin");
        assert_eq!(file_extension("photo.jpeg", "image/png"), "jpeg");
    }
}
