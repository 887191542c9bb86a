use crate::config::EngineConfig;
use crate::entities::{prelude::*, *};
use crate::error::AppError;
use crate::models::{self, CreateComment};
use crate::utils::validation::{
    clamp_limit, clamp_offset, validate_external_id, validate_record_id,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

pub struct CommentService;

impl CommentService {
    /// A parent_id is stored as given; its existence is not enforced
    /// transactionally, so readers must tolerate replies whose parent
    /// has since been deleted.
    pub async fn create_comment(
        db: &DatabaseConnection,
        attachment_id: &str,
        author_id: &str,
        payload: CreateComment,
    ) -> Result<attachment_comments::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;
        validate_external_id(author_id, "user")?;
        models::check(&payload)?;
        if let Some(ref parent_id) = payload.parent_id {
            validate_record_id(parent_id, "parent comment")?;
        }

        let now = Utc::now();
        let comment = attachment_comments::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            attachment_id: Set(attachment_id.to_string()),
            user_id: Set(author_id.to_string()),
            content: Set(payload.content),
            parent_id: Set(payload.parent_id),
            is_edited: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(comment.insert(db).await?)
    }

    pub async fn get_comment(
        db: &DatabaseConnection,
        comment_id: &str,
    ) -> Result<attachment_comments::Model, AppError> {
        validate_record_id(comment_id, "comment")?;

        AttachmentComments::find_by_id(comment_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))
    }

    pub async fn list_comments(
        db: &DatabaseConnection,
        config: &EngineConfig,
        attachment_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<attachment_comments::Model>, AppError> {
        validate_external_id(attachment_id, "attachment")?;

        let comments = AttachmentComments::find()
            .filter(attachment_comments::Column::AttachmentId.eq(attachment_id))
            .order_by_desc(attachment_comments::Column::CreatedAt)
            .limit(clamp_limit(limit, config))
            .offset(clamp_offset(offset))
            .all(db)
            .await?;

        Ok(comments)
    }

    /// Replaces the content and forces the edited flag. Authorship is
    /// not checked here; authorization is the caller's concern.
    pub async fn update_comment(
        db: &DatabaseConnection,
        comment_id: &str,
        content: String,
    ) -> Result<attachment_comments::Model, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "Comment content is required".to_string(),
            ));
        }

        let comment = Self::get_comment(db, comment_id).await?;

        let mut comment: attachment_comments::ActiveModel = comment.into();
        comment.content = Set(content);
        comment.is_edited = Set(true);
        comment.updated_at = Set(Utc::now());

        Ok(comment.update(db).await?)
    }

    /// Removes the single record. Replies referencing it are left in
    /// place as orphans and render as "reply to deleted comment".
    pub async fn delete_comment(db: &DatabaseConnection, comment_id: &str) -> Result<(), AppError> {
        validate_record_id(comment_id, "comment")?;

        AttachmentComments::delete_by_id(comment_id).exec(db).await?;
        Ok(())
    }
}
