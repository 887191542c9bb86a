use crate::config::EngineConfig;
use crate::entities::{prelude::*, *};
use crate::error::AppError;
use crate::utils::validation::{clamp_limit, clamp_offset, validate_external_id};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// Uniqueness-constrained many-to-many links: tags and colored labels
/// keyed by (attachment, text), favorites keyed by (attachment, user).
/// Duplicate adds surface as Conflict, which callers may treat as
/// idempotent success; removes are no-ops when the link is absent.
pub struct LabelService;

impl LabelService {
    // ── Tags ──

    pub async fn add_tag(
        db: &DatabaseConnection,
        attachment_id: &str,
        tag: &str,
        added_by: &str,
    ) -> Result<attachment_tags::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;
        validate_external_id(added_by, "user")?;
        if tag.trim().is_empty() {
            return Err(AppError::InvalidArgument("Tag text is required".to_string()));
        }

        let model = attachment_tags::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            attachment_id: Set(attachment_id.to_string()),
            tag: Set(tag.to_string()),
            added_by: Set(added_by.to_string()),
            created_at: Set(Utc::now()),
        };

        Ok(model.insert(db).await?)
    }

    pub async fn remove_tag(
        db: &DatabaseConnection,
        attachment_id: &str,
        tag: &str,
    ) -> Result<(), AppError> {
        validate_external_id(attachment_id, "attachment")?;

        AttachmentTags::delete_many()
            .filter(attachment_tags::Column::AttachmentId.eq(attachment_id))
            .filter(attachment_tags::Column::Tag.eq(tag))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn list_tags(
        db: &DatabaseConnection,
        attachment_id: &str,
    ) -> Result<Vec<attachment_tags::Model>, AppError> {
        validate_external_id(attachment_id, "attachment")?;

        let tags = AttachmentTags::find()
            .filter(attachment_tags::Column::AttachmentId.eq(attachment_id))
            .order_by_asc(attachment_tags::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(tags)
    }

    /// Paginated reverse lookup (tag -> attachments), insertion order.
    pub async fn search_by_tag(
        db: &DatabaseConnection,
        config: &EngineConfig,
        tag: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<attachment_tags::Model>, AppError> {
        let tags = AttachmentTags::find()
            .filter(attachment_tags::Column::Tag.eq(tag))
            .order_by_asc(attachment_tags::Column::CreatedAt)
            .limit(clamp_limit(limit, config))
            .offset(clamp_offset(offset))
            .all(db)
            .await?;

        Ok(tags)
    }

    // ── Favorites ──

    pub async fn add_favorite(
        db: &DatabaseConnection,
        attachment_id: &str,
        user_id: &str,
    ) -> Result<attachment_favorites::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;
        validate_external_id(user_id, "user")?;

        let model = attachment_favorites::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            attachment_id: Set(attachment_id.to_string()),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now()),
        };

        Ok(model.insert(db).await?)
    }

    pub async fn remove_favorite(
        db: &DatabaseConnection,
        attachment_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        validate_external_id(attachment_id, "attachment")?;
        validate_external_id(user_id, "user")?;

        AttachmentFavorites::delete_many()
            .filter(attachment_favorites::Column::AttachmentId.eq(attachment_id))
            .filter(attachment_favorites::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn list_favorites(
        db: &DatabaseConnection,
        config: &EngineConfig,
        user_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<attachment_favorites::Model>, AppError> {
        validate_external_id(user_id, "user")?;

        let favorites = AttachmentFavorites::find()
            .filter(attachment_favorites::Column::UserId.eq(user_id))
            .order_by_desc(attachment_favorites::Column::CreatedAt)
            .limit(clamp_limit(limit, config))
            .offset(clamp_offset(offset))
            .all(db)
            .await?;

        Ok(favorites)
    }

    pub async fn is_favorited(
        db: &DatabaseConnection,
        attachment_id: &str,
        user_id: &str,
    ) -> Result<bool, AppError> {
        let count = AttachmentFavorites::find()
            .filter(attachment_favorites::Column::AttachmentId.eq(attachment_id))
            .filter(attachment_favorites::Column::UserId.eq(user_id))
            .count(db)
            .await?;

        Ok(count > 0)
    }

    // ── Labels ──

    pub async fn add_label(
        db: &DatabaseConnection,
        attachment_id: &str,
        label: &str,
        color: Option<String>,
        added_by: &str,
    ) -> Result<attachment_labels::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;
        validate_external_id(added_by, "user")?;
        if label.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "Label text is required".to_string(),
            ));
        }

        let model = attachment_labels::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            attachment_id: Set(attachment_id.to_string()),
            label: Set(label.to_string()),
            color: Set(color),
            added_by: Set(added_by.to_string()),
            created_at: Set(Utc::now()),
        };

        Ok(model.insert(db).await?)
    }

    pub async fn remove_label(
        db: &DatabaseConnection,
        attachment_id: &str,
        label: &str,
    ) -> Result<(), AppError> {
        validate_external_id(attachment_id, "attachment")?;

        AttachmentLabels::delete_many()
            .filter(attachment_labels::Column::AttachmentId.eq(attachment_id))
            .filter(attachment_labels::Column::Label.eq(label))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn list_labels(
        db: &DatabaseConnection,
        attachment_id: &str,
    ) -> Result<Vec<attachment_labels::Model>, AppError> {
        validate_external_id(attachment_id, "attachment")?;

        let labels = AttachmentLabels::find()
            .filter(attachment_labels::Column::AttachmentId.eq(attachment_id))
            .order_by_asc(attachment_labels::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(labels)
    }

    pub async fn search_by_label(
        db: &DatabaseConnection,
        config: &EngineConfig,
        label: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<attachment_labels::Model>, AppError> {
        let labels = AttachmentLabels::find()
            .filter(attachment_labels::Column::Label.eq(label))
            .order_by_asc(attachment_labels::Column::CreatedAt)
            .limit(clamp_limit(limit, config))
            .offset(clamp_offset(offset))
            .all(db)
            .await?;

        Ok(labels)
    }
}
