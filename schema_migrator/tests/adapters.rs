//! Adapter selection and lifecycle through the `Migrator` client

use std::path::Path;

use pretty_assertions::assert_eq;
use rstest::rstest;

use schema_migrator::config::{Config, DatabaseConfig, MigrationsConfig};
use schema_migrator::{for_connection, Connection, DatabaseType, Error, Migrator};

fn sqlite_config(dir: &Path) -> Config {
    Config {
        database: DatabaseConfig {
            url: format!("sqlite://{}", dir.join("db/bookshelf.sqlite").display()),
            database_type: None,
            pool_size: Some(1),
            timeout_seconds: Some(1),
        },
        migrations: MigrationsConfig {
            schema: dir.join("db/schema.sql"),
        },
        logging: None,
    }
}

#[rstest]
#[case("create")]
#[case("drop")]
#[case("load")]
#[tokio::test]
async fn unknown_dialect_rejects_lifecycle_verbs(#[case] verb: &str) {
    let connection = Connection::new(
        "sqlserver://localhost/bookshelf",
        DatabaseType::Other("sqlserver".to_string()),
        None,
    )
    .unwrap();
    let adapter = for_connection(&connection, Path::new("db/schema.sql"));

    let result = match verb {
        "create" => adapter.create().await,
        "drop" => adapter.drop().await,
        _ => adapter.load().await,
    };

    let err = result.unwrap_err();
    let message = err.migration_message().expect("a migration error");
    assert!(message.contains("sqlserver"), "{}", message);
    assert!(message.contains(verb), "{}", message);
}

#[tokio::test]
async fn unknown_dialect_has_no_version_without_handle() {
    let connection = Connection::new(
        "sqlserver://localhost/bookshelf",
        DatabaseType::Other("sqlserver".to_string()),
        None,
    )
    .unwrap();
    let adapter = for_connection(&connection, Path::new("db/schema.sql"));

    assert_eq!(adapter.version().await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let migrator = Migrator::new(sqlite_config(dir.path())).unwrap();
    let database = dir.path().join("db/bookshelf.sqlite");

    assert_eq!(migrator.adapter().dialect_name(), "sqlite");

    migrator.create().await.unwrap();
    assert!(database.exists());

    assert_eq!(migrator.version().await.unwrap(), None);

    migrator.drop().await.unwrap();
    assert!(!database.exists());

    let err = migrator.drop().await.unwrap_err();
    assert!(matches!(err, Error::MigrationError(_)));
    assert_eq!(
        err.migration_message(),
        Some(format!("Cannot find database: {}", database.display()).as_str())
    );
}

#[tokio::test]
async fn sqlite_prepare_without_schema_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let migrator = Migrator::new(sqlite_config(dir.path())).unwrap();

    migrator.prepare().await.unwrap();

    assert!(dir.path().join("db/bookshelf.sqlite").exists());
}

#[tokio::test]
async fn console_from_migrator() {
    let dir = tempfile::tempdir().unwrap();
    let migrator = Migrator::new(sqlite_config(dir.path())).unwrap();

    let console = migrator.console().unwrap();
    assert_eq!(
        console.connection_string(),
        format!("sqlite3 {}", dir.path().join("db/bookshelf.sqlite").display())
    );
}

#[tokio::test]
async fn jdbc_mysql_is_selected_from_config_override() {
    let config = Config {
        database: DatabaseConfig {
            url: "jdbc:mysql://localhost/bookshelf?user=root".to_string(),
            database_type: Some("jdbc_mysql".to_string()),
            pool_size: None,
            timeout_seconds: None,
        },
        migrations: MigrationsConfig::default(),
        logging: None,
    };
    let migrator = Migrator::new(config).unwrap();

    assert_eq!(migrator.adapter().dialect_name(), "jdbc_mysql");

    let err = migrator.load().await.unwrap_err();
    assert_eq!(
        err.migration_message(),
        Some("Current adapter (jdbc_mysql) doesn't support load.")
    );
}

#[tokio::test]
async fn init_reads_configuration_file() {
    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("bookshelf.sqlite");
    let schema = dir.path().join("structure.sql");
    let config_path = dir.path().join("schema_migrator.toml");
    std::fs::write(
        &config_path,
        format!(
            "[database]\nurl = \"sqlite://{}\"\n\n[migrations]\nschema = \"{}\"\n",
            database.display(),
            schema.display()
        ),
    )
    .unwrap();

    let migrator = schema_migrator::init(&config_path.to_string_lossy()).unwrap();

    assert_eq!(migrator.config().migrations.schema, schema);
    assert_eq!(migrator.adapter().dialect_name(), "sqlite");
    assert_eq!(migrator.version().await.unwrap(), None);
}

#[test]
fn init_with_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");

    assert!(schema_migrator::init(&missing.to_string_lossy()).is_err());
}
