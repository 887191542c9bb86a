use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One immutable entry in an attachment's version ledger.
/// (attachment_id, version_num) is unique; the index is the backstop
/// against two concurrent creators computing the same number.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attachment_versions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub attachment_id: String,
    pub version_num: i32,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_key: String,
    pub checksum: String,
    pub uploaded_by: String,
    pub comment: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
