use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Public share link. `is_active` only ever transitions true -> false;
/// `download_count` only increments and never passes `max_downloads`
/// when that limit is positive (0 means unlimited).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "share_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub attachment_id: String,
    #[sea_orm(unique)]
    pub code: String,
    pub created_by: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub max_downloads: i32,
    pub download_count: i32,
    pub expires_at: Option<DateTimeUtc>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
