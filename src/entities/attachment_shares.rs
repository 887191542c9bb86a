use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A direct share is a grant *event*: no uniqueness constraint, multiple
/// shares to the same recipient are legal.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attachment_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub attachment_id: String,
    pub shared_by: String,
    pub shared_with: String,
    pub permission: String, // "view", "download" or "edit"
    pub expires_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
