use crate::entities::{prelude::*, *};
use crate::error::AppError;
use crate::models::{self, NewVersion};
use crate::utils::validation::{validate_external_id, validate_record_id};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// How often a racing create retries with a freshly computed number
/// before the Conflict is surfaced to the caller.
const CREATE_ATTEMPTS: u32 = 3;

pub struct VersionService;

impl VersionService {
    /// Append a new version, numbered one past the highest existing
    /// version. The highest existing record is the source of truth, not
    /// a separate counter; the unique index on (attachment_id,
    /// version_num) is the backstop when two creators race.
    pub async fn create_version(
        db: &DatabaseConnection,
        attachment_id: &str,
        payload: NewVersion,
    ) -> Result<attachment_versions::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;
        models::check(&payload)?;

        let mut last_conflict = None;
        for attempt in 0..CREATE_ATTEMPTS {
            let version_num = Self::latest_version_num(db, attachment_id).await? + 1;

            let version = attachment_versions::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                attachment_id: Set(attachment_id.to_string()),
                version_num: Set(version_num),
                file_name: Set(payload.file_name.clone()),
                mime_type: Set(payload.mime_type.clone()),
                size: Set(payload.size),
                storage_key: Set(payload.storage_key.clone()),
                checksum: Set(payload.checksum.clone()),
                uploaded_by: Set(payload.uploaded_by.clone()),
                comment: Set(payload.comment.clone()),
                created_at: Set(Utc::now()),
            };

            match version.insert(db).await.map_err(AppError::from) {
                Ok(model) => return Ok(model),
                Err(err) if err.is_conflict() => {
                    tracing::warn!(
                        attachment_id,
                        version_num,
                        attempt,
                        "version number raced with a concurrent create, recomputing"
                    );
                    last_conflict = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_conflict
            .unwrap_or_else(|| AppError::Conflict("version numbering kept racing".to_string())))
    }

    /// All versions of an attachment, newest-first.
    pub async fn list_versions(
        db: &DatabaseConnection,
        attachment_id: &str,
    ) -> Result<Vec<attachment_versions::Model>, AppError> {
        validate_external_id(attachment_id, "attachment")?;

        let versions = AttachmentVersions::find()
            .filter(attachment_versions::Column::AttachmentId.eq(attachment_id))
            .order_by_desc(attachment_versions::Column::VersionNum)
            .all(db)
            .await?;

        Ok(versions)
    }

    pub async fn get_version(
        db: &DatabaseConnection,
        attachment_id: &str,
        version_num: i32,
    ) -> Result<attachment_versions::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;

        AttachmentVersions::find()
            .filter(attachment_versions::Column::AttachmentId.eq(attachment_id))
            .filter(attachment_versions::Column::VersionNum.eq(version_num))
            .one(db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Version {} of attachment {} not found",
                    version_num, attachment_id
                ))
            })
    }

    /// Highest version number on record, 0 when the ledger is empty.
    pub async fn latest_version_num(
        db: &DatabaseConnection,
        attachment_id: &str,
    ) -> Result<i32, AppError> {
        let latest = AttachmentVersions::find()
            .filter(attachment_versions::Column::AttachmentId.eq(attachment_id))
            .order_by_desc(attachment_versions::Column::VersionNum)
            .one(db)
            .await?;

        Ok(latest.map(|v| v.version_num).unwrap_or(0))
    }

    /// Removes one version record unconditionally. Remaining versions
    /// are not renumbered and the sole remaining version is deletable.
    pub async fn delete_version(db: &DatabaseConnection, version_id: &str) -> Result<(), AppError> {
        validate_record_id(version_id, "version")?;

        AttachmentVersions::delete_by_id(version_id).exec(db).await?;
        Ok(())
    }
}
