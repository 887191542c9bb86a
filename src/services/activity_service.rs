use crate::config::EngineConfig;
use crate::entities::{prelude::*, *};
use crate::error::AppError;
use crate::utils::validation::{clamp_limit, clamp_offset, validate_external_id};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

/// Append-only audit trail. Records are never updated or deleted here;
/// retention/purge belongs to an external policy engine.
pub struct ActivityService;

impl ActivityService {
    pub async fn log_activity(
        db: &DatabaseConnection,
        attachment_id: &str,
        user_id: &str,
        action: &str,
        details: Option<Value>,
        ip_address: Option<String>,
    ) -> Result<attachment_activities::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;
        validate_external_id(user_id, "user")?;
        if action.trim().is_empty() {
            return Err(AppError::InvalidArgument("Action is required".to_string()));
        }

        info!(
            target: "activity",
            attachment_id,
            user_id,
            action,
            "attachment activity"
        );

        let record = attachment_activities::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            attachment_id: Set(attachment_id.to_string()),
            user_id: Set(user_id.to_string()),
            action: Set(action.to_string()),
            details: Set(details.map(|v| v.to_string())),
            ip_address: Set(ip_address),
            created_at: Set(Utc::now()),
        };

        Ok(record.insert(db).await?)
    }

    pub async fn list_activity(
        db: &DatabaseConnection,
        config: &EngineConfig,
        attachment_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<attachment_activities::Model>, AppError> {
        validate_external_id(attachment_id, "attachment")?;

        let records = AttachmentActivities::find()
            .filter(attachment_activities::Column::AttachmentId.eq(attachment_id))
            .order_by_desc(attachment_activities::Column::CreatedAt)
            .limit(clamp_limit(limit, config))
            .offset(clamp_offset(offset))
            .all(db)
            .await?;

        Ok(records)
    }

    pub async fn list_user_activity(
        db: &DatabaseConnection,
        config: &EngineConfig,
        user_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<attachment_activities::Model>, AppError> {
        validate_external_id(user_id, "user")?;

        let records = AttachmentActivities::find()
            .filter(attachment_activities::Column::UserId.eq(user_id))
            .order_by_desc(attachment_activities::Column::CreatedAt)
            .limit(clamp_limit(limit, config))
            .offset(clamp_offset(offset))
            .all(db)
            .await?;

        Ok(records)
    }
}
