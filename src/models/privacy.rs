use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{FileRecord, FolderWithFiles};

pub const PIN_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    File,
    Folder,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::File => "file",
            ResourceKind::Folder => "folder",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "file" => Ok(ResourceKind::File),
            "folder" => Ok(ResourceKind::Folder),
            _ => Err(format!("unknown resource type: {s}")),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource as returned by the privacy gate, never carrying its PIN hash.
#[derive(Debug, Serialize)]
#[serde(tag = "resourceType", content = "resource", rename_all = "lowercase")]
pub enum PrivateResource {
    File(FileRecord),
    Folder(FolderWithFiles),
}

impl PrivateResource {
    pub fn id(&self) -> Uuid {
        match self {
            PrivateResource::File(file) => file.id,
            PrivateResource::Folder(folder) => folder.folder.id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRequest {
    pub password: String,
    pub resource_type: ResourceKind,
}

/// Checks the 4-digit PIN shape at the boundary. Only set-password
/// enforces the digits rule; verification accepts any 4-character guess and
/// lets the hash comparison reject it.
pub fn validate_pin(pin: &str, digits_only: bool) -> Result<()> {
    if pin.chars().count() != PIN_LENGTH {
        return Err(AppError::BadRequest(format!(
            "PIN must be exactly {} characters",
            PIN_LENGTH
        )));
    }
    if digits_only && !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest("Must be 4-digit PIN".to_string()));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPasswordResponse {
    pub access_granted: bool,
    pub access_token: String,
    pub expires_in: i64,
    pub resource_type: ResourceKind,
    pub resource_id: Uuid,
}
