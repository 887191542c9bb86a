use crate::config::EngineConfig;
use crate::entities::{prelude::*, *};
use crate::error::AppError;
use crate::models::{self, CreateCollection, UpdateCollection};
use crate::utils::validation::{
    clamp_limit, clamp_offset, validate_external_id, validate_record_id,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// Ordered groupings of attachments with a cached item count. The item
/// insert/delete and the counter bump are separate statements with no
/// shared transaction: a crash between them leaves the count stale, so
/// the count is a cache and `recount` is the repair path. The counter
/// itself is only ever mutated through store-side increment
/// expressions, never read-modify-write.
pub struct CollectionService;

impl CollectionService {
    pub async fn create_collection(
        db: &DatabaseConnection,
        workspace_id: &str,
        created_by: &str,
        payload: CreateCollection,
    ) -> Result<attachment_collections::Model, AppError> {
        validate_external_id(workspace_id, "workspace")?;
        validate_external_id(created_by, "user")?;
        models::check(&payload)?;

        let now = Utc::now();
        let collection = attachment_collections::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(payload.name),
            description: Set(payload.description),
            workspace_id: Set(workspace_id.to_string()),
            created_by: Set(created_by.to_string()),
            item_count: Set(0),
            is_public: Set(payload.is_public),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(collection.insert(db).await?)
    }

    pub async fn get_collection(
        db: &DatabaseConnection,
        collection_id: &str,
    ) -> Result<attachment_collections::Model, AppError> {
        validate_record_id(collection_id, "collection")?;

        AttachmentCollections::find_by_id(collection_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", collection_id)))
    }

    pub async fn list_collections(
        db: &DatabaseConnection,
        config: &EngineConfig,
        workspace_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<attachment_collections::Model>, AppError> {
        validate_external_id(workspace_id, "workspace")?;

        let collections = AttachmentCollections::find()
            .filter(attachment_collections::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(attachment_collections::Column::CreatedAt)
            .limit(clamp_limit(limit, config))
            .offset(clamp_offset(offset))
            .all(db)
            .await?;

        Ok(collections)
    }

    pub async fn update_collection(
        db: &DatabaseConnection,
        collection_id: &str,
        payload: UpdateCollection,
    ) -> Result<attachment_collections::Model, AppError> {
        models::check(&payload)?;

        let collection = Self::get_collection(db, collection_id).await?;

        let mut collection: attachment_collections::ActiveModel = collection.into();
        if let Some(name) = payload.name {
            collection.name = Set(name);
        }
        if let Some(description) = payload.description {
            collection.description = Set(Some(description));
        }
        if let Some(is_public) = payload.is_public {
            collection.is_public = Set(is_public);
        }
        collection.updated_at = Set(Utc::now());

        Ok(collection.update(db).await?)
    }

    /// Insert the item, then bump the cached count. When no position is
    /// given the item lands after the current live items. A failure of
    /// the second step is logged and left to `recount`, not rolled back.
    pub async fn add_to_collection(
        db: &DatabaseConnection,
        collection_id: &str,
        attachment_id: &str,
        added_by: &str,
        position: Option<i32>,
    ) -> Result<collection_items::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;
        validate_external_id(added_by, "user")?;

        // Existence check doubles as id validation.
        Self::get_collection(db, collection_id).await?;

        let position = match position {
            Some(p) => p,
            None => {
                let live = CollectionItems::find()
                    .filter(collection_items::Column::CollectionId.eq(collection_id))
                    .count(db)
                    .await?;
                live as i32
            }
        };

        let item = collection_items::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            collection_id: Set(collection_id.to_string()),
            attachment_id: Set(attachment_id.to_string()),
            added_by: Set(added_by.to_string()),
            position: Set(position),
            added_at: Set(Utc::now()),
        };

        let item = item.insert(db).await?;

        let bump = AttachmentCollections::update_many()
            .col_expr(
                attachment_collections::Column::ItemCount,
                Expr::col(attachment_collections::Column::ItemCount).add(1),
            )
            .filter(attachment_collections::Column::Id.eq(collection_id))
            .exec(db)
            .await;
        if let Err(err) = bump {
            tracing::warn!(
                collection_id,
                error = %err,
                "item inserted but count increment failed, recount will repair"
            );
        }

        Ok(item)
    }

    /// Deletes the item and decrements the count only when a row was
    /// actually removed. Removing an absent item is a no-op.
    pub async fn remove_from_collection(
        db: &DatabaseConnection,
        collection_id: &str,
        attachment_id: &str,
    ) -> Result<(), AppError> {
        validate_record_id(collection_id, "collection")?;
        validate_external_id(attachment_id, "attachment")?;

        let deleted = CollectionItems::delete_many()
            .filter(collection_items::Column::CollectionId.eq(collection_id))
            .filter(collection_items::Column::AttachmentId.eq(attachment_id))
            .exec(db)
            .await?;

        if deleted.rows_affected == 0 {
            return Ok(());
        }

        let dec = AttachmentCollections::update_many()
            .col_expr(
                attachment_collections::Column::ItemCount,
                Expr::col(attachment_collections::Column::ItemCount).sub(1),
            )
            .filter(attachment_collections::Column::Id.eq(collection_id))
            .filter(attachment_collections::Column::ItemCount.gt(0))
            .exec(db)
            .await;
        if let Err(err) = dec {
            tracing::warn!(
                collection_id,
                error = %err,
                "item removed but count decrement failed, recount will repair"
            );
        }

        Ok(())
    }

    /// Items ordered by position, insertion order on ties.
    pub async fn list_collection_items(
        db: &DatabaseConnection,
        config: &EngineConfig,
        collection_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<collection_items::Model>, AppError> {
        validate_record_id(collection_id, "collection")?;

        let items = CollectionItems::find()
            .filter(collection_items::Column::CollectionId.eq(collection_id))
            .order_by_asc(collection_items::Column::Position)
            .order_by_asc(collection_items::Column::AddedAt)
            .limit(clamp_limit(limit, config))
            .offset(clamp_offset(offset))
            .all(db)
            .await?;

        Ok(items)
    }

    /// Recompute the cached count from the authoritative item rows and
    /// store it. First-class repair path for counter drift.
    pub async fn recount(db: &DatabaseConnection, collection_id: &str) -> Result<u64, AppError> {
        validate_record_id(collection_id, "collection")?;

        let live = CollectionItems::find()
            .filter(collection_items::Column::CollectionId.eq(collection_id))
            .count(db)
            .await?;

        let result = AttachmentCollections::update_many()
            .col_expr(
                attachment_collections::Column::ItemCount,
                Expr::value(live as i32),
            )
            .col_expr(
                attachment_collections::Column::UpdatedAt,
                Expr::value(Utc::now()),
            )
            .filter(attachment_collections::Column::Id.eq(collection_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "Collection {} not found",
                collection_id
            )));
        }

        tracing::info!(collection_id, count = live, "collection recounted");
        Ok(live)
    }

    /// Deletes the collection, then best-effort cascades to its items.
    /// An add racing the delete can strand a single item; that item is
    /// unreachable through the collection and the race is documented,
    /// not hidden.
    pub async fn delete_collection(
        db: &DatabaseConnection,
        collection_id: &str,
    ) -> Result<(), AppError> {
        validate_record_id(collection_id, "collection")?;

        let deleted = AttachmentCollections::delete_by_id(collection_id)
            .exec(db)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "Collection {} not found",
                collection_id
            )));
        }

        match CollectionItems::delete_many()
            .filter(collection_items::Column::CollectionId.eq(collection_id))
            .exec(db)
            .await
        {
            Ok(items) => {
                tracing::debug!(
                    collection_id,
                    items = items.rows_affected,
                    "collection deleted with items"
                );
            }
            Err(err) => {
                tracing::warn!(
                    collection_id,
                    error = %err,
                    "collection deleted but item cascade failed, items orphaned"
                );
            }
        }

        Ok(())
    }
}
