use crate::config::EngineConfig;
use crate::entities::{prelude::*, *};
use crate::error::AppError;
use crate::models::{
    AttachmentStats, SizeBucket, TopUploader, TypeDistributionEntry, UploadTrendEntry, UserQuota,
    WorkspaceStats,
};
use crate::utils::validation::validate_external_id;
use chrono::{Duration, Utc};
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use std::collections::HashMap;

const DELETED_STATUS: &str = "deleted";

/// Bucket lower bounds for the size distribution: 0, 1 KiB, 100 KiB,
/// 1 MiB, 10 MiB, 100 MiB, 1 GiB (last bucket unbounded above).
const SIZE_BOUNDARIES: [i64; 7] = [
    0,
    1024,
    102_400,
    1_048_576,
    10_485_760,
    104_857_600,
    1_073_741_824,
];

#[derive(FromQueryResult)]
struct GroupedRow {
    key: Option<String>,
    count: i64,
    total_size: Option<i64>,
}

#[derive(FromQueryResult)]
struct TotalsRow {
    count: i64,
    total_size: Option<i64>,
}

/// Stateless, read-only views over the attachment corpus. Every call
/// runs fresh scans with no caching layer; a response composed of
/// several queries is consistent with the corpus at each query's scan
/// time only, and the pieces may disagree under heavy concurrent
/// writes. "Deleted" is the status predicate maintained by the base
/// attachment service, never a cascade trigger for engine entities.
pub struct StatsService;

impl StatsService {
    /// SUM() comes back as NUMERIC on Postgres; cast so it decodes as i64
    /// on both backends.
    fn size_sum() -> sea_orm::sea_query::SimpleExpr {
        attachments::Column::Size.sum().cast_as(Alias::new("BIGINT"))
    }

    pub async fn get_attachment_stats(
        db: &DatabaseConnection,
        workspace_id: &str,
    ) -> Result<AttachmentStats, AppError> {
        validate_external_id(workspace_id, "workspace")?;

        let rows: Vec<GroupedRow> = Attachments::find()
            .select_only()
            .column_as(attachments::Column::MimeType, "key")
            .column_as(attachments::Column::Id.count(), "count")
            .column_as(Self::size_sum(), "total_size")
            .filter(attachments::Column::WorkspaceId.eq(workspace_id))
            .filter(attachments::Column::Status.ne(DELETED_STATUS))
            .group_by(attachments::Column::MimeType)
            .into_model()
            .all(db)
            .await?;

        let mut stats = AttachmentStats {
            total_files: 0,
            total_size: 0,
            by_type: HashMap::new(),
            recent_uploads_24h: 0,
        };
        for row in rows {
            stats.total_files += row.count;
            stats.total_size += row.total_size.unwrap_or(0);
            stats
                .by_type
                .insert(row.key.unwrap_or_default(), row.count);
        }

        let day_ago = Utc::now() - Duration::hours(24);
        stats.recent_uploads_24h = Attachments::find()
            .filter(attachments::Column::WorkspaceId.eq(workspace_id))
            .filter(attachments::Column::CreatedAt.gte(day_ago))
            .count(db)
            .await? as i64;

        Ok(stats)
    }

    pub async fn get_user_quota(
        db: &DatabaseConnection,
        config: &EngineConfig,
        user_id: &str,
    ) -> Result<UserQuota, AppError> {
        validate_external_id(user_id, "user")?;

        let totals: Option<TotalsRow> = Attachments::find()
            .select_only()
            .column_as(attachments::Column::Id.count(), "count")
            .column_as(Self::size_sum(), "total_size")
            .filter(attachments::Column::UserId.eq(user_id))
            .filter(attachments::Column::Status.ne(DELETED_STATUS))
            .into_model()
            .one(db)
            .await?;

        let (file_count, used_bytes) = totals
            .map(|t| (t.count, t.total_size.unwrap_or(0)))
            .unwrap_or((0, 0));

        Ok(UserQuota {
            user_id: user_id.to_string(),
            used_bytes,
            max_bytes: config.quota_max_bytes,
            file_count,
            max_files: config.quota_max_files,
        })
    }

    pub async fn get_workspace_stats(
        db: &DatabaseConnection,
        workspace_id: &str,
    ) -> Result<WorkspaceStats, AppError> {
        validate_external_id(workspace_id, "workspace")?;

        let totals: Option<TotalsRow> = Attachments::find()
            .select_only()
            .column_as(attachments::Column::Id.count(), "count")
            .column_as(Self::size_sum(), "total_size")
            .filter(attachments::Column::WorkspaceId.eq(workspace_id))
            .filter(attachments::Column::Status.ne(DELETED_STATUS))
            .into_model()
            .one(db)
            .await?;

        let uploader_count = Attachments::find()
            .select_only()
            .column(attachments::Column::UserId)
            .distinct()
            .filter(attachments::Column::WorkspaceId.eq(workspace_id))
            .filter(attachments::Column::Status.ne(DELETED_STATUS))
            .count(db)
            .await? as i64;

        let (total_files, total_size) = totals
            .map(|t| (t.count, t.total_size.unwrap_or(0)))
            .unwrap_or((0, 0));

        Ok(WorkspaceStats {
            workspace_id: workspace_id.to_string(),
            total_files,
            total_size,
            uploader_count,
        })
    }

    /// Per-mime-type count and size across all workspaces, most
    /// frequent type first.
    pub async fn get_type_distribution(
        db: &DatabaseConnection,
    ) -> Result<Vec<TypeDistributionEntry>, AppError> {
        let rows: Vec<GroupedRow> = Attachments::find()
            .select_only()
            .column_as(attachments::Column::MimeType, "key")
            .column_as(attachments::Column::Id.count(), "count")
            .column_as(Self::size_sum(), "total_size")
            .filter(attachments::Column::Status.ne(DELETED_STATUS))
            .group_by(attachments::Column::MimeType)
            .order_by_desc(attachments::Column::Id.count())
            .into_model()
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| TypeDistributionEntry {
                mime_type: row.key.unwrap_or_default(),
                count: row.count,
                total_size: row.total_size.unwrap_or(0),
            })
            .collect())
    }

    /// Counts per size bucket. One query per bucket; the buckets are
    /// read at slightly different instants (accepted, like every other
    /// multi-query aggregate here).
    pub async fn get_size_distribution(
        db: &DatabaseConnection,
    ) -> Result<Vec<SizeBucket>, AppError> {
        let mut buckets = Vec::with_capacity(SIZE_BOUNDARIES.len());

        for (i, &floor) in SIZE_BOUNDARIES.iter().enumerate() {
            let mut query = Attachments::find()
                .filter(attachments::Column::Status.ne(DELETED_STATUS))
                .filter(attachments::Column::Size.gte(floor));
            if let Some(&ceiling) = SIZE_BOUNDARIES.get(i + 1) {
                query = query.filter(attachments::Column::Size.lt(ceiling));
            }
            let count = query.count(db).await? as i64;
            buckets.push(SizeBucket {
                floor_bytes: floor,
                count,
            });
        }

        Ok(buckets)
    }

    /// Per-day upload count and size, latest 30 days first.
    pub async fn get_upload_trends(
        db: &DatabaseConnection,
    ) -> Result<Vec<UploadTrendEntry>, AppError> {
        let rows: Vec<GroupedRow> = Attachments::find()
            .select_only()
            .column_as(Expr::cust("CAST(DATE(created_at) AS TEXT)"), "key")
            .column_as(attachments::Column::Id.count(), "count")
            .column_as(Self::size_sum(), "total_size")
            .group_by(Expr::cust("DATE(created_at)"))
            .order_by_desc(Expr::cust("DATE(created_at)"))
            .limit(30)
            .into_model()
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| UploadTrendEntry {
                day: row.key.unwrap_or_default(),
                count: row.count,
                total_size: row.total_size.unwrap_or(0),
            })
            .collect())
    }

    /// Top 20 uploaders by file count.
    pub async fn get_top_uploaders(db: &DatabaseConnection) -> Result<Vec<TopUploader>, AppError> {
        let rows: Vec<GroupedRow> = Attachments::find()
            .select_only()
            .column_as(attachments::Column::UserId, "key")
            .column_as(attachments::Column::Id.count(), "count")
            .column_as(Self::size_sum(), "total_size")
            .filter(attachments::Column::Status.ne(DELETED_STATUS))
            .group_by(attachments::Column::UserId)
            .order_by_desc(attachments::Column::Id.count())
            .limit(20)
            .into_model()
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopUploader {
                user_id: row.key.unwrap_or_default(),
                count: row.count,
                total_size: row.total_size.unwrap_or(0),
            })
            .collect())
    }
}
