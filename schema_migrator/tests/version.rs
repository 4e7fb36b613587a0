//! Version lookup against a live SQLite database

use std::path::Path;

use pretty_assertions::assert_eq;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use schema_migrator::config::{Config, DatabaseConfig, MigrationsConfig};
use schema_migrator::db::migrations::{current_version, latest_migration, table_exists};
use schema_migrator::{for_connection, Connection, DatabaseConnection, DatabaseType, Migrator};

async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

async fn with_migrations(pool: &SqlitePool, filenames: &[&str]) {
    sqlx::query("CREATE TABLE schema_migrations (filename TEXT PRIMARY KEY)")
        .execute(pool)
        .await
        .unwrap();

    for filename in filenames {
        sqlx::query("INSERT INTO schema_migrations (filename) VALUES (?)")
            .bind(*filename)
            .execute(pool)
            .await
            .unwrap();
    }
}

fn connection(pool: &SqlitePool) -> Connection {
    Connection::new(
        "sqlite::memory:",
        DatabaseType::Sqlite,
        Some(DatabaseConnection::Sqlite(pool.clone())),
    )
    .unwrap()
}

#[tokio::test]
async fn version_is_none_without_migrations_table() {
    let pool = memory_pool().await;
    let connection = connection(&pool);
    let adapter = for_connection(&connection, Path::new("db/schema.sql"));

    assert_eq!(adapter.version().await.unwrap(), None);
}

#[tokio::test]
async fn version_is_none_for_empty_migrations_table() {
    let pool = memory_pool().await;
    with_migrations(&pool, &[]).await;
    let connection = connection(&pool);
    let adapter = for_connection(&connection, Path::new("db/schema.sql"));

    assert_eq!(adapter.version().await.unwrap(), None);
}

#[tokio::test]
async fn version_is_prefix_of_last_filename() {
    let pool = memory_pool().await;
    with_migrations(
        &pool,
        &[
            "20150610141017_add_price_to_books.rb",
            "20150610133853_create_books.rb",
            "20141110123045_create_authors.rb",
        ],
    )
    .await;
    let connection = connection(&pool);
    let adapter = for_connection(&connection, Path::new("db/schema.sql"));

    assert_eq!(
        adapter.version().await.unwrap(),
        Some("20150610141017".to_string())
    );
}

#[tokio::test]
async fn version_is_empty_for_malformed_last_filename() {
    let pool = memory_pool().await;
    with_migrations(
        &pool,
        &["20150610133853_create_books.rb", "create_authors.rb"],
    )
    .await;
    let connection = connection(&pool);
    let adapter = for_connection(&connection, Path::new("db/schema.sql"));

    assert_eq!(adapter.version().await.unwrap(), Some(String::new()));
}

#[tokio::test]
async fn unknown_dialect_still_reports_version_through_its_handle() {
    let pool = memory_pool().await;
    with_migrations(&pool, &["20150610133853_create_books.rb"]).await;
    let connection = Connection::new(
        "sqlite::memory:",
        DatabaseType::Other("custom".to_string()),
        Some(DatabaseConnection::Sqlite(pool.clone())),
    )
    .unwrap();
    let adapter = for_connection(&connection, Path::new("db/schema.sql"));

    assert_eq!(adapter.dialect_name(), "base");
    assert_eq!(
        adapter.version().await.unwrap(),
        Some("20150610133853".to_string())
    );
}

#[tokio::test]
async fn migrations_helpers() {
    let pool = memory_pool().await;
    let handle = DatabaseConnection::Sqlite(pool.clone());

    assert!(!table_exists(&handle, "schema_migrations").await.unwrap());
    assert_eq!(current_version(&handle).await.unwrap(), None);

    with_migrations(&pool, &["20150610133853_a.rb", "20150610133854_b.rb"]).await;

    assert!(table_exists(&handle, "schema_migrations").await.unwrap());
    assert_eq!(
        latest_migration(&handle).await.unwrap().as_deref(),
        Some("20150610133854_b.rb")
    );
}

#[tokio::test]
async fn migrator_reports_version_through_existing_connection() {
    let pool = memory_pool().await;
    with_migrations(&pool, &["20150610133853_create_books.rb"]).await;
    let config = Config {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            database_type: None,
            pool_size: None,
            timeout_seconds: None,
        },
        migrations: MigrationsConfig::default(),
        logging: None,
    };
    let migrator = Migrator::with_connection(config, connection(&pool));

    assert_eq!(migrator.config().database.url, "sqlite::memory:");
    assert_eq!(
        migrator.version().await.unwrap(),
        Some("20150610133853".to_string())
    );
}
