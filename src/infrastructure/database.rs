use crate::entities::{
    attachment_activities, attachment_collections, attachment_comments, attachment_favorites,
    attachment_labels, attachment_permissions, attachment_shares, attachment_tags,
    attachment_versions, attachments, collection_items, share_links,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::env;
use std::time::Duration;
use tracing::info;

pub async fn setup_database() -> anyhow::Result<DatabaseConnection> {
    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    info!("Database: {}", db_url);

    let mut opt = ConnectOptions::new(&db_url);
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());

    if db_url.starts_with("postgres://") {
        info!("Running SQLx migrations for PostgreSQL...");
        let pool = sqlx::PgPool::connect(&db_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        return Ok(());
    }

    info!("Running SeaORM auto-migrations for SQLite/Other...");
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let stmts = vec![
        schema
            .create_table_from_entity(attachments::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(attachment_versions::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(attachment_comments::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(attachment_tags::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(attachment_favorites::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(attachment_labels::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(attachment_shares::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(attachment_permissions::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(share_links::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(attachment_collections::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(collection_items::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(attachment_activities::Entity)
            .if_not_exists()
            .to_owned(),
    ];

    for stmt in stmts {
        let stmt = builder.build(&stmt);
        let _ = db.execute(stmt).await;
    }

    // Composite uniqueness constraints and list-query indexes. The
    // unique indexes are the only cross-request ordering mechanism the
    // engine relies on; the rest serve the primary access patterns.
    let indexes = [
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_versions_attachment_num ON attachment_versions(attachment_id, version_num);",
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_tags_attachment_tag ON attachment_tags(attachment_id, tag);",
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_favorites_attachment_user ON attachment_favorites(attachment_id, user_id);",
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_labels_attachment_label ON attachment_labels(attachment_id, label);",
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_permissions_attachment_user ON attachment_permissions(attachment_id, user_id);",
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_collection_items_collection_attachment ON collection_items(collection_id, attachment_id);",
        "CREATE INDEX IF NOT EXISTS idx_comments_attachment ON attachment_comments(attachment_id);",
        "CREATE INDEX IF NOT EXISTS idx_tags_tag ON attachment_tags(tag);",
        "CREATE INDEX IF NOT EXISTS idx_labels_label ON attachment_labels(label);",
        "CREATE INDEX IF NOT EXISTS idx_favorites_user ON attachment_favorites(user_id);",
        "CREATE INDEX IF NOT EXISTS idx_shares_attachment ON attachment_shares(attachment_id);",
        "CREATE INDEX IF NOT EXISTS idx_shares_shared_with ON attachment_shares(shared_with);",
        "CREATE INDEX IF NOT EXISTS idx_share_links_attachment ON share_links(attachment_id);",
        "CREATE INDEX IF NOT EXISTS idx_collections_workspace ON attachment_collections(workspace_id);",
        "CREATE INDEX IF NOT EXISTS idx_collection_items_collection ON collection_items(collection_id);",
        "CREATE INDEX IF NOT EXISTS idx_activities_attachment ON attachment_activities(attachment_id);",
        "CREATE INDEX IF NOT EXISTS idx_activities_user ON attachment_activities(user_id);",
        "CREATE INDEX IF NOT EXISTS idx_activities_created ON attachment_activities(created_at DESC);",
        "CREATE INDEX IF NOT EXISTS idx_attachments_workspace ON attachments(workspace_id, status);",
        "CREATE INDEX IF NOT EXISTS idx_attachments_user ON attachments(user_id, status);",
    ];

    for sql in indexes {
        db.execute(sea_orm::Statement::from_string(builder, sql.to_string()))
            .await?;
    }

    Ok(())
}
