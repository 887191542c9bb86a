use crate::config::EngineConfig;
use crate::entities::{prelude::*, *};
use crate::error::AppError;
use crate::models::SearchAttachments;
use crate::services::label_service::LabelService;
use crate::utils::validation::{clamp_limit, clamp_offset, validate_external_id};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

const DELETED_STATUS: &str = "deleted";

/// Reads and bulk mutations against the base attachments table. The
/// engine issues these but the external attachment service owns the
/// schema; deletion here means marking status, never purging, and never
/// cascading into the engine's own entities.
pub struct AttachmentService;

impl AttachmentService {
    pub async fn find_by_id(
        db: &DatabaseConnection,
        attachment_id: &str,
    ) -> Result<attachments::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;

        Attachments::find_by_id(attachment_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attachment {} not found", attachment_id)))
    }

    /// Case-insensitive name search with optional type filter,
    /// non-deleted only, newest-first.
    pub async fn search(
        db: &DatabaseConnection,
        config: &EngineConfig,
        workspace_id: &str,
        params: SearchAttachments,
    ) -> Result<Vec<attachments::Model>, AppError> {
        validate_external_id(workspace_id, "workspace")?;

        let mut cond = Condition::all()
            .add(attachments::Column::WorkspaceId.eq(workspace_id))
            .add(attachments::Column::Status.ne(DELETED_STATUS));

        if let Some(ref query) = params.query {
            if !query.is_empty() {
                cond = cond.add(
                    Expr::expr(Func::lower(Expr::col(attachments::Column::OriginalName)))
                        .like(format!("%{}%", query.to_lowercase())),
                );
            }
        }
        if let Some(ref file_type) = params.file_type {
            if !file_type.is_empty() {
                cond = cond.add(attachments::Column::MimeType.eq(file_type));
            }
        }

        let results = Attachments::find()
            .filter(cond)
            .order_by_desc(attachments::Column::CreatedAt)
            .limit(clamp_limit(params.limit, config))
            .offset(clamp_offset(params.offset))
            .all(db)
            .await?;

        Ok(results)
    }

    pub async fn get_recent(
        db: &DatabaseConnection,
        config: &EngineConfig,
        user_id: &str,
        limit: Option<u64>,
    ) -> Result<Vec<attachments::Model>, AppError> {
        validate_external_id(user_id, "user")?;

        let results = Attachments::find()
            .filter(attachments::Column::UserId.eq(user_id))
            .filter(attachments::Column::Status.ne(DELETED_STATUS))
            .order_by_desc(attachments::Column::CreatedAt)
            .limit(clamp_limit(limit, config))
            .all(db)
            .await?;

        Ok(results)
    }

    pub async fn list_by_workspace(
        db: &DatabaseConnection,
        config: &EngineConfig,
        workspace_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<attachments::Model>, AppError> {
        validate_external_id(workspace_id, "workspace")?;

        let results = Attachments::find()
            .filter(attachments::Column::WorkspaceId.eq(workspace_id))
            .filter(attachments::Column::Status.ne(DELETED_STATUS))
            .order_by_desc(attachments::Column::CreatedAt)
            .limit(clamp_limit(limit, config))
            .offset(clamp_offset(offset))
            .all(db)
            .await?;

        Ok(results)
    }

    /// Marks the given attachments deleted in one statement. Returns how
    /// many records were touched; ids that do not exist are skipped.
    pub async fn bulk_delete(db: &DatabaseConnection, ids: &[String]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Err(AppError::InvalidArgument(
                "At least one attachment id is required".to_string(),
            ));
        }

        let result = Attachments::update_many()
            .col_expr(attachments::Column::Status, Expr::value(DELETED_STATUS))
            .col_expr(attachments::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(attachments::Column::Id.is_in(ids.iter().map(String::as_str)))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn bulk_move(
        db: &DatabaseConnection,
        ids: &[String],
        channel_id: &str,
    ) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Err(AppError::InvalidArgument(
                "At least one attachment id is required".to_string(),
            ));
        }
        validate_external_id(channel_id, "channel")?;

        let result = Attachments::update_many()
            .col_expr(attachments::Column::ChannelId, Expr::value(channel_id))
            .col_expr(attachments::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(attachments::Column::Id.is_in(ids.iter().map(String::as_str)))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Tags each given attachment. A Conflict on one id means it already
    /// carried the tag and does not fail the batch; the return value is
    /// the number of attachments newly tagged.
    pub async fn bulk_tag(
        db: &DatabaseConnection,
        ids: &[String],
        tag: &str,
        added_by: &str,
    ) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Err(AppError::InvalidArgument(
                "At least one attachment id is required".to_string(),
            ));
        }

        let mut tagged: u64 = 0;
        for id in ids {
            match LabelService::add_tag(db, id, tag, added_by).await {
                Ok(_) => tagged += 1,
                Err(err) if err.is_conflict() => {}
                Err(err) => return Err(err),
            }
        }

        Ok(tagged)
    }
}
