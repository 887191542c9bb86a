use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Base attachment record, owned by the external attachment service.
/// The engine reads it for stats/quota aggregation and issues bulk
/// status mutations against it, but does not own its schema.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub workspace_id: String,
    pub channel_id: Option<String>,
    pub user_id: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub status: String, // "active" or "deleted"; treated purely as a filter predicate
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
