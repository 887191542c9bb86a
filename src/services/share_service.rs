use crate::config::EngineConfig;
use crate::entities::{prelude::*, *};
use crate::error::AppError;
use crate::models::{self, CreateShare, CreateShareLink, SetPermission};
use crate::utils::validation::{
    clamp_limit, clamp_offset, validate_external_id, validate_record_id,
};
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// 36-symbol alphabet for share-link codes.
const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub struct ShareService;

impl ShareService {
    /// Generate a candidate share-link code. Collisions are possible and
    /// handled by the insert-retry loop in `create_share_link`.
    pub fn generate_code(length: usize) -> String {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }

    /// Hash a share-link password using argon2
    pub fn hash_password(password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Verify a share-link password against the stored hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
        let argon2 = Argon2::default();
        let parsed_hash =
            argon2::PasswordHash::new(hash).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    // ── Direct shares ──

    /// Inserts unconditionally: each share is a distinct grant event and
    /// repeat shares to the same recipient are legal.
    pub async fn create_share(
        db: &DatabaseConnection,
        attachment_id: &str,
        shared_by: &str,
        payload: CreateShare,
    ) -> Result<attachment_shares::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;
        validate_external_id(shared_by, "user")?;
        models::check(&payload)?;

        let share = attachment_shares::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            attachment_id: Set(attachment_id.to_string()),
            shared_by: Set(shared_by.to_string()),
            shared_with: Set(payload.shared_with),
            permission: Set(payload.permission.as_str().to_string()),
            expires_at: Set(payload.expires_at),
            created_at: Set(Utc::now()),
        };

        Ok(share.insert(db).await?)
    }

    pub async fn list_shares(
        db: &DatabaseConnection,
        attachment_id: &str,
    ) -> Result<Vec<attachment_shares::Model>, AppError> {
        validate_external_id(attachment_id, "attachment")?;

        let shares = AttachmentShares::find()
            .filter(attachment_shares::Column::AttachmentId.eq(attachment_id))
            .order_by_desc(attachment_shares::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(shares)
    }

    pub async fn list_shared_with(
        db: &DatabaseConnection,
        config: &EngineConfig,
        user_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<attachment_shares::Model>, AppError> {
        validate_external_id(user_id, "user")?;

        let shares = AttachmentShares::find()
            .filter(attachment_shares::Column::SharedWith.eq(user_id))
            .order_by_desc(attachment_shares::Column::CreatedAt)
            .limit(clamp_limit(limit, config))
            .offset(clamp_offset(offset))
            .all(db)
            .await?;

        Ok(shares)
    }

    pub async fn delete_share(db: &DatabaseConnection, share_id: &str) -> Result<(), AppError> {
        validate_record_id(share_id, "share")?;

        AttachmentShares::delete_by_id(share_id).exec(db).await?;
        Ok(())
    }

    // ── Permission ACL ──

    /// Single atomic upsert keyed on (attachment_id, user_id): the first
    /// grant inserts, repeat grants replace all four capability flags and
    /// the granter. Replace, not merge: a repeat grant that omits a
    /// previously-granted capability revokes it. created_at survives.
    pub async fn set_permission(
        db: &DatabaseConnection,
        attachment_id: &str,
        granted_by: &str,
        payload: SetPermission,
    ) -> Result<attachment_permissions::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;
        validate_external_id(granted_by, "user")?;
        models::check(&payload)?;

        let now = Utc::now();
        let user_id = payload.user_id.clone();
        let perm = attachment_permissions::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            attachment_id: Set(attachment_id.to_string()),
            user_id: Set(payload.user_id),
            can_view: Set(payload.can_view),
            can_download: Set(payload.can_download),
            can_delete: Set(payload.can_delete),
            can_share: Set(payload.can_share),
            granted_by: Set(granted_by.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        AttachmentPermissions::insert(perm)
            .on_conflict(
                OnConflict::columns([
                    attachment_permissions::Column::AttachmentId,
                    attachment_permissions::Column::UserId,
                ])
                .update_columns([
                    attachment_permissions::Column::CanView,
                    attachment_permissions::Column::CanDownload,
                    attachment_permissions::Column::CanDelete,
                    attachment_permissions::Column::CanShare,
                    attachment_permissions::Column::GrantedBy,
                    attachment_permissions::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        Self::get_permission(db, attachment_id, &user_id).await
    }

    pub async fn get_permission(
        db: &DatabaseConnection,
        attachment_id: &str,
        user_id: &str,
    ) -> Result<attachment_permissions::Model, AppError> {
        AttachmentPermissions::find()
            .filter(attachment_permissions::Column::AttachmentId.eq(attachment_id))
            .filter(attachment_permissions::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No permission record for user {} on attachment {}",
                    user_id, attachment_id
                ))
            })
    }

    pub async fn list_permissions(
        db: &DatabaseConnection,
        attachment_id: &str,
    ) -> Result<Vec<attachment_permissions::Model>, AppError> {
        validate_external_id(attachment_id, "attachment")?;

        let permissions = AttachmentPermissions::find()
            .filter(attachment_permissions::Column::AttachmentId.eq(attachment_id))
            .all(db)
            .await?;

        Ok(permissions)
    }

    pub async fn delete_permission(
        db: &DatabaseConnection,
        attachment_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        validate_external_id(attachment_id, "attachment")?;
        validate_external_id(user_id, "user")?;

        AttachmentPermissions::delete_many()
            .filter(attachment_permissions::Column::AttachmentId.eq(attachment_id))
            .filter(attachment_permissions::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(())
    }

    // ── Share links ──

    /// Create a public share link. The code is generated, inserted, and
    /// regenerated on a uniqueness Conflict up to the configured bound,
    /// never taken from a single best-effort draw.
    pub async fn create_share_link(
        db: &DatabaseConnection,
        config: &EngineConfig,
        attachment_id: &str,
        created_by: &str,
        payload: CreateShareLink,
    ) -> Result<share_links::Model, AppError> {
        validate_external_id(attachment_id, "attachment")?;
        validate_external_id(created_by, "user")?;
        models::check(&payload)?;

        let password_hash = match payload.password {
            Some(ref p) if !p.is_empty() => Some(Self::hash_password(p)?),
            _ => None,
        };

        for attempt in 0..config.share_code_max_attempts {
            let code = Self::generate_code(config.share_code_length);

            let link = share_links::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                attachment_id: Set(attachment_id.to_string()),
                code: Set(code.clone()),
                created_by: Set(created_by.to_string()),
                password_hash: Set(password_hash.clone()),
                max_downloads: Set(payload.max_downloads),
                download_count: Set(0),
                expires_at: Set(payload.expires_at),
                is_active: Set(true),
                created_at: Set(Utc::now()),
            };

            match link.insert(db).await.map_err(AppError::from) {
                Ok(model) => return Ok(model),
                Err(err) if err.is_conflict() => {
                    tracing::warn!(attempt, %code, "share code collided, regenerating");
                }
                Err(err) => return Err(err),
            }
        }

        Err(AppError::Conflict(
            "Could not allocate a unique share code".to_string(),
        ))
    }

    /// Resolution checks, in order: the code exists and the link is
    /// still active. Expiry and password verification remain the
    /// caller's responsibility before honoring a download.
    pub async fn get_share_link_by_code(
        db: &DatabaseConnection,
        code: &str,
    ) -> Result<share_links::Model, AppError> {
        let link = ShareLinks::find()
            .filter(share_links::Column::Code.eq(code))
            .filter(share_links::Column::IsActive.eq(true))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Share link not found".to_string()))?;

        Ok(link)
    }

    pub async fn list_share_links(
        db: &DatabaseConnection,
        attachment_id: &str,
    ) -> Result<Vec<share_links::Model>, AppError> {
        validate_external_id(attachment_id, "attachment")?;

        let links = ShareLinks::find()
            .filter(share_links::Column::AttachmentId.eq(attachment_id))
            .order_by_desc(share_links::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(links)
    }

    /// Bump the download counter and, when the new value reaches a
    /// positive max_downloads, flip is_active to false, all in one
    /// conditional UPDATE. The statement refuses inactive or exhausted
    /// links, so two concurrent downloads cannot both pass a pre-check
    /// read and an increment past the limit is never recorded.
    pub async fn increment_download(
        db: &DatabaseConnection,
        code: &str,
    ) -> Result<share_links::Model, AppError> {
        let result = ShareLinks::update_many()
            .col_expr(
                share_links::Column::DownloadCount,
                Expr::col(share_links::Column::DownloadCount).add(1),
            )
            .col_expr(
                share_links::Column::IsActive,
                Expr::cust("(max_downloads = 0 OR download_count + 1 < max_downloads)"),
            )
            .filter(share_links::Column::Code.eq(code))
            .filter(share_links::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(share_links::Column::MaxDownloads.eq(0))
                    .add(Expr::cust("download_count < max_downloads")),
            )
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            let link = ShareLinks::find()
                .filter(share_links::Column::Code.eq(code))
                .one(db)
                .await?;
            return match link {
                None => Err(AppError::NotFound("Share link not found".to_string())),
                Some(_) => Err(AppError::Conflict(
                    "Share link is inactive or its download limit is reached".to_string(),
                )),
            };
        }

        ShareLinks::find()
            .filter(share_links::Column::Code.eq(code))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Share link not found".to_string()))
    }

    /// One-way transition: a deactivated link is never reactivated.
    pub async fn deactivate_share_link(
        db: &DatabaseConnection,
        link_id: &str,
    ) -> Result<(), AppError> {
        validate_record_id(link_id, "share link")?;

        let result = ShareLinks::update_many()
            .col_expr(share_links::Column::IsActive, Expr::value(false))
            .filter(share_links::Column::Id.eq(link_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "Share link {} not found",
                link_id
            )));
        }
        Ok(())
    }
}
