use attachment_collab::AppError;
use attachment_collab::config::EngineConfig;
use attachment_collab::entities::{attachment_collections, prelude::*};
use attachment_collab::infrastructure::database;
use attachment_collab::models::{CreateCollection, UpdateCollection};
use attachment_collab::services::CollectionService;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Database, EntityTrait, QueryFilter};

async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

fn collection(name: &str) -> CreateCollection {
    CreateCollection {
        name: name.to_string(),
        description: None,
        is_public: false,
    }
}

#[tokio::test]
async fn test_collection_end_to_end_ordering_and_count() {
    let db = setup_test_db().await;
    let config = EngineConfig::default();

    let reports = CollectionService::create_collection(&db, "ws-1", "user-a", collection("Reports"))
        .await
        .unwrap();
    assert_eq!(reports.item_count, 0);

    CollectionService::add_to_collection(&db, &reports.id, "att-x", "user-a", Some(0))
        .await
        .unwrap();
    CollectionService::add_to_collection(&db, &reports.id, "att-y", "user-a", Some(1))
        .await
        .unwrap();

    let items = CollectionService::list_collection_items(&db, &config, &reports.id, None, None)
        .await
        .unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i.attachment_id.as_str()).collect();
    assert_eq!(ids, vec!["att-x", "att-y"]);
    assert_eq!(
        CollectionService::get_collection(&db, &reports.id)
            .await
            .unwrap()
            .item_count,
        2
    );

    CollectionService::remove_from_collection(&db, &reports.id, "att-x")
        .await
        .unwrap();

    let items = CollectionService::list_collection_items(&db, &config, &reports.id, None, None)
        .await
        .unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i.attachment_id.as_str()).collect();
    assert_eq!(ids, vec!["att-y"]);
    assert_eq!(
        CollectionService::get_collection(&db, &reports.id)
            .await
            .unwrap()
            .item_count,
        1
    );
}

#[tokio::test]
async fn test_add_remove_restores_count() {
    let db = setup_test_db().await;

    let c = CollectionService::create_collection(&db, "ws-1", "user-a", collection("Scratch"))
        .await
        .unwrap();

    CollectionService::add_to_collection(&db, &c.id, "att-1", "user-a", None)
        .await
        .unwrap();
    CollectionService::remove_from_collection(&db, &c.id, "att-1")
        .await
        .unwrap();

    assert_eq!(
        CollectionService::get_collection(&db, &c.id).await.unwrap().item_count,
        0
    );

    // Removing an item that is not there is a no-op and does not touch
    // the count.
    CollectionService::remove_from_collection(&db, &c.id, "att-1")
        .await
        .unwrap();
    assert_eq!(
        CollectionService::get_collection(&db, &c.id).await.unwrap().item_count,
        0
    );
}

#[tokio::test]
async fn test_duplicate_item_is_conflict_and_count_untouched() {
    let db = setup_test_db().await;

    let c = CollectionService::create_collection(&db, "ws-1", "user-a", collection("Dups"))
        .await
        .unwrap();

    CollectionService::add_to_collection(&db, &c.id, "att-1", "user-a", None)
        .await
        .unwrap();
    let err = CollectionService::add_to_collection(&db, &c.id, "att-1", "user-b", None)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    assert_eq!(
        CollectionService::get_collection(&db, &c.id).await.unwrap().item_count,
        1
    );
}

#[tokio::test]
async fn test_default_position_appends() {
    let db = setup_test_db().await;
    let config = EngineConfig::default();

    let c = CollectionService::create_collection(&db, "ws-1", "user-a", collection("Ordered"))
        .await
        .unwrap();

    for id in ["att-1", "att-2", "att-3"] {
        CollectionService::add_to_collection(&db, &c.id, id, "user-a", None)
            .await
            .unwrap();
    }

    let items = CollectionService::list_collection_items(&db, &config, &c.id, None, None)
        .await
        .unwrap();
    let positions: Vec<i32> = items.iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_recount_repairs_drift() {
    let db = setup_test_db().await;

    let c = CollectionService::create_collection(&db, "ws-1", "user-a", collection("Drifted"))
        .await
        .unwrap();
    CollectionService::add_to_collection(&db, &c.id, "att-1", "user-a", None)
        .await
        .unwrap();
    CollectionService::add_to_collection(&db, &c.id, "att-2", "user-a", None)
        .await
        .unwrap();

    // Simulate drift from a half-completed sequence.
    AttachmentCollections::update_many()
        .col_expr(attachment_collections::Column::ItemCount, Expr::value(42))
        .filter(attachment_collections::Column::Id.eq(c.id.clone()))
        .exec(&db)
        .await
        .unwrap();

    let live = CollectionService::recount(&db, &c.id).await.unwrap();
    assert_eq!(live, 2);
    assert_eq!(
        CollectionService::get_collection(&db, &c.id).await.unwrap().item_count,
        2
    );
}

#[tokio::test]
async fn test_delete_collection_cascades_to_items() {
    let db = setup_test_db().await;
    let config = EngineConfig::default();

    let c = CollectionService::create_collection(&db, "ws-1", "user-a", collection("Doomed"))
        .await
        .unwrap();
    CollectionService::add_to_collection(&db, &c.id, "att-1", "user-a", None)
        .await
        .unwrap();

    CollectionService::delete_collection(&db, &c.id).await.unwrap();

    let err = CollectionService::get_collection(&db, &c.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let items = CollectionService::list_collection_items(&db, &config, &c.id, None, None)
        .await
        .unwrap();
    assert!(items.is_empty());

    let err = CollectionService::delete_collection(&db, &c.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_update_collection_partial_fields() {
    let db = setup_test_db().await;
    let config = EngineConfig::default();

    let c = CollectionService::create_collection(&db, "ws-1", "user-a", collection("Old Name"))
        .await
        .unwrap();

    let updated = CollectionService::update_collection(
        &db,
        &c.id,
        UpdateCollection {
            name: Some("New Name".to_string()),
            description: None,
            is_public: Some(true),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "New Name");
    assert!(updated.is_public);
    assert_eq!(updated.description, None);

    let listed = CollectionService::list_collections(&db, &config, "ws-1", None, None)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let err = CollectionService::add_to_collection(&db, "not-a-uuid", "att-1", "user-a", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}
