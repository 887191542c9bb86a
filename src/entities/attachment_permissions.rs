use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Current-state ACL snapshot, one row per (attachment_id, user_id).
/// Repeat grants replace all four flags and the granter; created_at is
/// preserved across upserts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attachment_permissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub attachment_id: String,
    pub user_id: String,
    pub can_view: bool,
    pub can_download: bool,
    pub can_delete: bool,
    pub can_share: bool,
    pub granted_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
