use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Named ordered grouping of attachments. `item_count` is a cached
/// aggregate of the collection_items rows and can drift under partial
/// failure; `CollectionService::recount` repairs it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attachment_collections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub workspace_id: String,
    pub created_by: String,
    pub item_count: i32,
    pub is_public: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
