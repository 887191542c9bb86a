use attachment_collab::AppError;
use attachment_collab::config::EngineConfig;
use attachment_collab::infrastructure::database;
use attachment_collab::models::CreateComment;
use attachment_collab::services::CommentService;
use sea_orm::Database;

async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

fn comment(content: &str, parent_id: Option<String>) -> CreateComment {
    CreateComment {
        content: content.to_string(),
        parent_id,
    }
}

#[tokio::test]
async fn test_create_and_list_comments() {
    let db = setup_test_db().await;
    let config = EngineConfig::default();

    let first = CommentService::create_comment(&db, "att-1", "user-a", comment("first", None))
        .await
        .unwrap();
    assert!(!first.is_edited);
    assert_eq!(first.created_at, first.updated_at);

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    CommentService::create_comment(&db, "att-1", "user-b", comment("second", None))
        .await
        .unwrap();

    let comments = CommentService::list_comments(&db, &config, "att-1", None, None)
        .await
        .unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].content, "second");
    assert_eq!(comments[1].content, "first");
}

#[tokio::test]
async fn test_update_comment_forces_edited_flag() {
    let db = setup_test_db().await;

    let created = CommentService::create_comment(&db, "att-1", "user-a", comment("draft", None))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let updated = CommentService::update_comment(&db, &created.id, "final".to_string())
        .await
        .unwrap();

    assert_eq!(updated.content, "final");
    assert!(updated.is_edited);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    // Updating again keeps the flag set.
    let again = CommentService::update_comment(&db, &created.id, "final v2".to_string())
        .await
        .unwrap();
    assert!(again.is_edited);
}

#[tokio::test]
async fn test_delete_comment_leaves_replies_orphaned() {
    let db = setup_test_db().await;
    let config = EngineConfig::default();

    let parent = CommentService::create_comment(&db, "att-1", "user-a", comment("parent", None))
        .await
        .unwrap();
    let reply = CommentService::create_comment(
        &db,
        "att-1",
        "user-b",
        comment("reply", Some(parent.id.clone())),
    )
    .await
    .unwrap();

    CommentService::delete_comment(&db, &parent.id).await.unwrap();

    // The reply survives and still carries the dangling parent id.
    let remaining = CommentService::list_comments(&db, &config, "att-1", None, None)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, reply.id);
    assert_eq!(remaining[0].parent_id.as_deref(), Some(parent.id.as_str()));

    // Readers resolving the parent get NotFound, which they must tolerate.
    let err = CommentService::get_comment(&db, &parent.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_comment_validation() {
    let db = setup_test_db().await;

    let err = CommentService::create_comment(&db, "att-1", "user-a", comment("", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    let err = CommentService::create_comment(
        &db,
        "att-1",
        "user-a",
        comment("hi", Some("not-a-uuid".to_string())),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    let created = CommentService::create_comment(&db, "att-1", "user-a", comment("ok", None))
        .await
        .unwrap();
    let err = CommentService::update_comment(&db, &created.id, "   ".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}
