use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::error::AppError;

// ── Request payloads ──

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewVersion {
    #[validate(length(min = 1, message = "File name is required"))]
    pub file_name: String,
    #[validate(length(min = 1, message = "Mime type is required"))]
    pub mime_type: String,
    #[validate(range(min = 0, message = "File size must not be negative"))]
    pub size: i64,
    #[validate(length(min = 1, message = "Storage key is required"))]
    pub storage_key: String,
    pub checksum: String,
    #[validate(length(min = 1, message = "Uploader id is required"))]
    pub uploaded_by: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComment {
    #[validate(length(min = 1, message = "Comment content is required"))]
    pub content: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateShare {
    #[validate(length(min = 1, message = "Recipient is required"))]
    pub shared_with: String,
    pub permission: SharePermission,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
    View,
    Download,
    Edit,
}

impl SharePermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            SharePermission::View => "view",
            SharePermission::Download => "download",
            SharePermission::Edit => "edit",
        }
    }
}

impl std::str::FromStr for SharePermission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(SharePermission::View),
            "download" => Ok(SharePermission::Download),
            "edit" => Ok(SharePermission::Edit),
            other => Err(AppError::InvalidArgument(format!(
                "'{}' is not a share permission (view, download, edit)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetPermission {
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,
    pub can_view: bool,
    pub can_download: bool,
    pub can_delete: bool,
    pub can_share: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateShareLink {
    pub password: Option<String>,
    /// 0 means unlimited
    #[validate(range(min = 0, message = "Max downloads must not be negative"))]
    pub max_downloads: i32,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCollection {
    #[validate(length(min = 1, max = 255, message = "Collection name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCollection {
    #[validate(length(min = 1, max = 255, message = "Collection name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchAttachments {
    pub query: Option<String>,
    pub file_type: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

// ── Derived read-only views ──

#[derive(Debug, Clone, Serialize)]
pub struct UserQuota {
    pub user_id: String,
    pub used_bytes: i64,
    pub max_bytes: i64,
    pub file_count: i64,
    pub max_files: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentStats {
    pub total_files: i64,
    pub total_size: i64,
    pub by_type: HashMap<String, i64>,
    pub recent_uploads_24h: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceStats {
    pub workspace_id: String,
    pub total_files: i64,
    pub total_size: i64,
    pub uploader_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeDistributionEntry {
    pub mime_type: String,
    pub count: i64,
    pub total_size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SizeBucket {
    /// Inclusive lower bound of the bucket in bytes
    pub floor_bytes: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadTrendEntry {
    /// Day in "YYYY-MM-DD" form
    pub day: String,
    pub count: i64,
    pub total_size: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopUploader {
    pub user_id: String,
    pub count: i64,
    pub total_size: i64,
}

/// Maps a validator failure onto the stable InvalidArgument kind.
pub fn check(payload: &impl Validate) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::InvalidArgument(e.to_string()))
}
