use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit record. Never updated or deleted by the engine;
/// retention sweeps are an external policy concern.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attachment_activities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub attachment_id: String,
    pub user_id: String,
    pub action: String, // "uploaded", "downloaded", "viewed", "shared", "deleted", "commented", "tagged"
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
