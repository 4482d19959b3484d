use serde::Serialize;

use crate::models::{FileRecord, FileType, FolderRecord};

/// Renders a gigabyte amount the way every summary field is reported.
pub fn format_gb(gigabytes: f64) -> String {
    // Ties round away from zero.
    format!("{:.2}GB", (gigabytes * 100.0).round() / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatus {
    pub storage_limit: f64,
    pub used_storage: f64,
    pub remaining_storage: f64,
}

impl StorageStatus {
    pub fn new(storage_limit: f64, used_storage: f64) -> Self {
        Self {
            storage_limit,
            used_storage,
            remaining_storage: (storage_limit - used_storage).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageTotals {
    pub total: String,
    pub used: String,
    pub remaining: String,
}

impl From<StorageStatus> for StorageTotals {
    fn from(status: StorageStatus) -> Self {
        Self {
            total: format_gb(status.storage_limit),
            used: format_gb(status.used_storage),
            remaining: format_gb(status.remaining_storage),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderTotals {
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeSummary {
    pub count: i64,
    pub size: String,
}

impl Default for TypeSummary {
    fn default() -> Self {
        Self {
            count: 0,
            size: format_gb(0.0),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileTypeBreakdown {
    pub notes: TypeSummary,
    pub images: TypeSummary,
    pub pdfs: TypeSummary,
}

impl FileTypeBreakdown {
    /// Summary bucket for a type tag. Adding a `FileType` variant will not
    /// compile until it is given a bucket here.
    pub fn bucket_mut(&mut self, file_type: FileType) -> &mut TypeSummary {
        match file_type {
            FileType::Note => &mut self.notes,
            FileType::Image => &mut self.images,
            FileType::Pdf => &mut self.pdfs,
        }
    }

    pub fn record(&mut self, file_type: FileType, count: i64, total_size: f64) {
        let bucket = self.bucket_mut(file_type);
        bucket.count = count;
        bucket.size = format_gb(total_size);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageSummary {
    pub storage: StorageTotals,
    pub folders: FolderTotals,
    pub files: FileTypeBreakdown,
}

#[derive(Debug, Serialize)]
pub struct ByDateResponse {
    pub date: String,
    pub files: Vec<FileRecord>,
    pub folders: Vec<FolderRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_gb_uses_two_decimals() {
        assert_eq!(format_gb(0.0), "0.00GB");
        assert_eq!(format_gb(0.9500000000000001), "0.95GB");
        assert_eq!(format_gb(15.0), "15.00GB");
        assert_eq!(format_gb(0.125), "0.13GB");
        assert_eq!(format_gb(1.005 + 1e-9), "1.01GB");
    }

    #[test]
    fn test_remaining_never_negative() {
        let status = StorageStatus::new(1.0, 1.2);
        assert_eq!(status.remaining_storage, 0.0);
    }

    #[test]
    fn test_breakdown_buckets() {
        let mut breakdown = FileTypeBreakdown::default();
        breakdown.record(FileType::Note, 2, 0.5);
        breakdown.record(FileType::Pdf, 1, 0.125);

        assert_eq!(breakdown.notes.count, 2);
        assert_eq!(breakdown.notes.size, "0.50GB");
        assert_eq!(breakdown.images.count, 0);
        assert_eq!(breakdown.images.size, "0.00GB");
        assert_eq!(breakdown.pdfs.size, "0.13GB");
    }
}
