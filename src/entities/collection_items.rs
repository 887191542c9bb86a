use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// (collection_id, attachment_id) unique. `position` is a sparse
/// ordering key; ties resolve by insertion order (added_at).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collection_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub collection_id: String,
    pub attachment_id: String,
    pub added_by: String,
    pub position: i32,
    pub added_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
