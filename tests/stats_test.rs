use attachment_collab::config::EngineConfig;
use attachment_collab::entities::attachments;
use attachment_collab::infrastructure::database;
use attachment_collab::models::SearchAttachments;
use attachment_collab::services::{AttachmentService, StatsService};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Database, Set};

async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

async fn seed_attachment(
    db: &sea_orm::DatabaseConnection,
    id: &str,
    workspace_id: &str,
    user_id: &str,
    name: &str,
    mime_type: &str,
    size: i64,
    status: &str,
) {
    let now = Utc::now();
    attachments::ActiveModel {
        id: Set(id.to_string()),
        workspace_id: Set(workspace_id.to_string()),
        channel_id: Set(None),
        user_id: Set(user_id.to_string()),
        original_name: Set(name.to_string()),
        mime_type: Set(mime_type.to_string()),
        size: Set(size),
        status: Set(status.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap();
}

async fn seed_corpus(db: &sea_orm::DatabaseConnection) {
    seed_attachment(db, "att-1", "ws-1", "user-a", "Budget-Q3.pdf", "application/pdf", 100, "active").await;
    seed_attachment(db, "att-2", "ws-1", "user-a", "photo.png", "image/png", 2048, "active").await;
    seed_attachment(db, "att-3", "ws-1", "user-b", "scan.png", "image/png", 1_500_000, "active").await;
    seed_attachment(db, "att-4", "ws-1", "user-a", "old.pdf", "application/pdf", 512, "deleted").await;
    seed_attachment(db, "att-5", "ws-2", "user-c", "other.txt", "text/plain", 64, "active").await;
}

#[tokio::test]
async fn test_attachment_stats_counts_non_deleted_only() {
    let db = setup_test_db().await;
    seed_corpus(&db).await;

    let stats = StatsService::get_attachment_stats(&db, "ws-1").await.unwrap();
    assert_eq!(stats.total_files, 3);
    assert_eq!(stats.total_size, 100 + 2048 + 1_500_000);
    assert_eq!(stats.by_type.get("image/png"), Some(&2));
    assert_eq!(stats.by_type.get("application/pdf"), Some(&1));
    // Everything was seeded just now.
    assert_eq!(stats.recent_uploads_24h, 4);
}

#[tokio::test]
async fn test_user_quota_excludes_deleted() {
    let db = setup_test_db().await;
    let config = EngineConfig::default();
    seed_corpus(&db).await;

    let quota = StatsService::get_user_quota(&db, &config, "user-a").await.unwrap();
    assert_eq!(quota.file_count, 2);
    assert_eq!(quota.used_bytes, 100 + 2048);
    assert_eq!(quota.max_bytes, config.quota_max_bytes);
    assert_eq!(quota.max_files, config.quota_max_files);

    // A user with no attachments has an empty quota, not an error.
    let empty = StatsService::get_user_quota(&db, &config, "user-nobody")
        .await
        .unwrap();
    assert_eq!(empty.file_count, 0);
    assert_eq!(empty.used_bytes, 0);
}

#[tokio::test]
async fn test_workspace_stats_distinct_uploaders() {
    let db = setup_test_db().await;
    seed_corpus(&db).await;

    let stats = StatsService::get_workspace_stats(&db, "ws-1").await.unwrap();
    assert_eq!(stats.total_files, 3);
    assert_eq!(stats.total_size, 100 + 2048 + 1_500_000);
    assert_eq!(stats.uploader_count, 2);
}

#[tokio::test]
async fn test_type_and_size_distributions() {
    let db = setup_test_db().await;
    seed_corpus(&db).await;

    let types = StatsService::get_type_distribution(&db).await.unwrap();
    assert_eq!(types[0].mime_type, "image/png");
    assert_eq!(types[0].count, 2);
    assert_eq!(types[0].total_size, 2048 + 1_500_000);

    let buckets = StatsService::get_size_distribution(&db).await.unwrap();
    assert_eq!(buckets.len(), 7);
    // 64 and 100 land in [0, 1 KiB), 2048 in [1 KiB, 100 KiB),
    // 1.5 MB in [1 MiB, 10 MiB).
    assert_eq!(buckets[0].count, 2);
    assert_eq!(buckets[1].count, 1);
    assert_eq!(buckets[2].count, 0);
    assert_eq!(buckets[3].count, 1);
}

#[tokio::test]
async fn test_upload_trends_and_top_uploaders() {
    let db = setup_test_db().await;
    seed_corpus(&db).await;

    let trends = StatsService::get_upload_trends(&db).await.unwrap();
    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0].day, Utc::now().format("%Y-%m-%d").to_string());
    assert_eq!(trends[0].count, 5);

    let uploaders = StatsService::get_top_uploaders(&db).await.unwrap();
    assert_eq!(uploaders[0].user_id, "user-a");
    assert_eq!(uploaders[0].count, 2);
}

#[tokio::test]
async fn test_search_and_recent() {
    let db = setup_test_db().await;
    let config = EngineConfig::default();
    seed_corpus(&db).await;

    // Case-insensitive name match, deleted rows are invisible.
    let found = AttachmentService::search(
        &db,
        &config,
        "ws-1",
        SearchAttachments {
            query: Some("budget".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "att-1");

    let pngs = AttachmentService::search(
        &db,
        &config,
        "ws-1",
        SearchAttachments {
            file_type: Some("image/png".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(pngs.len(), 2);

    let gone = AttachmentService::search(
        &db,
        &config,
        "ws-1",
        SearchAttachments {
            query: Some("old".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(gone.is_empty());

    let recent = AttachmentService::get_recent(&db, &config, "user-a", Some(10))
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);

    let listed = AttachmentService::list_by_workspace(&db, &config, "ws-1", None, None)
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);
}

#[tokio::test]
async fn test_bulk_operations() {
    let db = setup_test_db().await;
    let config = EngineConfig::default();
    seed_corpus(&db).await;

    // Tag three, one of which is already tagged.
    AttachmentService::bulk_tag(
        &db,
        &["att-1".to_string()],
        "quarterly",
        "user-a",
    )
    .await
    .unwrap();
    let newly = AttachmentService::bulk_tag(
        &db,
        &["att-1".to_string(), "att-2".to_string(), "att-3".to_string()],
        "quarterly",
        "user-a",
    )
    .await
    .unwrap();
    assert_eq!(newly, 2);

    let moved = AttachmentService::bulk_move(
        &db,
        &["att-1".to_string(), "att-2".to_string()],
        "chan-9",
    )
    .await
    .unwrap();
    assert_eq!(moved, 2);
    let att = AttachmentService::find_by_id(&db, "att-1").await.unwrap();
    assert_eq!(att.channel_id.as_deref(), Some("chan-9"));

    // Marking deleted hides rows from quota and stats but purges nothing.
    let deleted = AttachmentService::bulk_delete(&db, &["att-1".to_string(), "att-no".to_string()])
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let att = AttachmentService::find_by_id(&db, "att-1").await.unwrap();
    assert_eq!(att.status, "deleted");

    let quota = StatsService::get_user_quota(&db, &config, "user-a").await.unwrap();
    assert_eq!(quota.file_count, 1);

    let stats = StatsService::get_attachment_stats(&db, "ws-1").await.unwrap();
    assert_eq!(stats.total_files, 2);
}
