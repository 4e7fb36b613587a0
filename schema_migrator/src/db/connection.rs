//! Database connection handling
//!
//! This module describes what an adapter operates on: the dialect tag, the
//! parsed connection URI, the options derived from it and the already-open
//! sqlx pool owned by the caller.

use std::fmt;
use std::time::Duration;

use percent_encoding::percent_decode_str;
use sqlx::{
    mysql::MySqlPoolOptions, postgres::PgPoolOptions, sqlite::SqlitePoolOptions, MySql, Pool,
    Postgres, Sqlite,
};
use url::Url;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

const JDBC_PREFIX: &str = "jdbc:";

/// The dialect a connection speaks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    Sqlite,
    Postgres,
    Mysql,
    JdbcMysql,
    Other(String),
}

impl DatabaseType {
    /// Detect the dialect from a connection URI's scheme
    pub fn detect(uri: &str) -> Self {
        if let Some(rest) = uri.strip_prefix(JDBC_PREFIX) {
            return match rest.split_once(':') {
                Some((driver, _)) if driver.eq_ignore_ascii_case("mysql") => DatabaseType::JdbcMysql,
                Some((driver, _)) => DatabaseType::Other(format!("jdbc_{}", driver.to_lowercase())),
                None => DatabaseType::Other("jdbc".to_string()),
            };
        }

        let scheme = uri.split_once(':').map(|(scheme, _)| scheme).unwrap_or(uri);
        match scheme.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => DatabaseType::Sqlite,
            "postgres" | "postgresql" => DatabaseType::Postgres,
            "mysql" | "mysql2" => DatabaseType::Mysql,
            other => DatabaseType::Other(other.to_string()),
        }
    }

    /// Map a configured type tag to a dialect. Unknown tags are kept as `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "sqlite" => DatabaseType::Sqlite,
            "postgres" | "postgresql" => DatabaseType::Postgres,
            "mysql" => DatabaseType::Mysql,
            "jdbc_mysql" => DatabaseType::JdbcMysql,
            other => DatabaseType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DatabaseType::Sqlite => "sqlite",
            DatabaseType::Postgres => "postgres",
            DatabaseType::Mysql => "mysql",
            DatabaseType::JdbcMysql => "jdbc_mysql",
            DatabaseType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed connection URI.
///
/// A leading `jdbc:` is stripped before parsing. User and password are
/// percent-decoded and, for JDBC style URIs, fall back to the `user` and
/// `password` query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionUri {
    url: Url,
    user: Option<String>,
    password: Option<String>,
}

impl ConnectionUri {
    pub fn parse(uri: &str) -> Result<Self> {
        let stripped = uri.strip_prefix(JDBC_PREFIX).unwrap_or(uri);
        let url = Url::parse(stripped)
            .map_err(|e| Error::InvalidUri(format!("{}: {}", uri, e)))?;

        let user = match url.username() {
            "" => query_param(&url, "user"),
            user => Some(decode(user)),
        };
        let password = match url.password() {
            Some(password) => Some(decode(password)),
            None => query_param(&url, "password"),
        };

        Ok(Self { url, user, password })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str().filter(|host| !host.is_empty())
    }

    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The raw, percent-decoded path
    pub fn path(&self) -> String {
        decode(self.url.path())
    }

    /// The database name: the path without its leading `/`
    pub fn database(&self) -> String {
        let path = self.path();
        path.strip_prefix('/').map(str::to_string).unwrap_or(path)
    }

    /// The file a SQLite URI points at.
    ///
    /// `sqlite://db/app.sqlite` names the relative file `db/app.sqlite`,
    /// `sqlite:///var/app.sqlite` an absolute one.
    pub fn file_path(&self) -> String {
        match self.host() {
            Some(host) => format!("{}{}", host, self.path()),
            None => self.path(),
        }
    }

    /// The server-level URI `scheme://[userinfo@]host[:port]`, without the
    /// database path, query or fragment
    pub fn server_uri(&self) -> Result<String> {
        let mut url = self.url.clone();
        url.set_path("");
        url.set_query(None);
        url.set_fragment(None);

        let invalid = || Error::InvalidUri(format!("{} has no host", self.url));
        url.set_username(self.user().unwrap_or(""))
            .map_err(|_| invalid())?;
        url.set_password(self.password()).map_err(|_| invalid())?;

        Ok(url.to_string())
    }
}

impl fmt::Display for ConnectionUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Connection options derived from the URI. Absent values stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub host: Option<String>,
    pub port: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConnectionOptions {
    pub fn from_uri(uri: &ConnectionUri, database_type: &DatabaseType) -> Self {
        let database = match database_type {
            DatabaseType::Sqlite => uri.file_path(),
            _ => uri.database(),
        };

        Self {
            host: uri.host().map(str::to_string),
            port: uri.port().map(|port| port.to_string()),
            database: Some(database).filter(|db| !db.is_empty()),
            user: uri.user().map(str::to_string),
            password: uri.password().map(str::to_string),
        }
    }
}

/// An open sqlx pool for one of the supported dialects
#[derive(Debug, Clone)]
pub enum DatabaseConnection {
    Postgres(Pool<Postgres>),
    MySql(Pool<MySql>),
    Sqlite(Pool<Sqlite>),
}

impl DatabaseConnection {
    /// Create a pool for the given dialect without connecting yet.
    ///
    /// Connecting lazily lets a descriptor exist for a database that has not
    /// been created.
    pub fn connect_lazy(
        database_type: &DatabaseType,
        url: &str,
        pool_size: u32,
        timeout: Duration,
    ) -> Result<Self> {
        match database_type {
            DatabaseType::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(timeout)
                    .connect_lazy(url)?;

                Ok(DatabaseConnection::Postgres(pool))
            }
            DatabaseType::Mysql | DatabaseType::JdbcMysql => {
                let pool = MySqlPoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(timeout)
                    .connect_lazy(url)?;

                Ok(DatabaseConnection::MySql(pool))
            }
            DatabaseType::Sqlite => {
                let pool = SqlitePoolOptions::new()
                    .max_connections(pool_size)
                    .acquire_timeout(timeout)
                    .connect_lazy(url)?;

                Ok(DatabaseConnection::Sqlite(pool))
            }
            DatabaseType::Other(tag) => Err(Error::DatabaseError(format!(
                "Unsupported database driver: {}",
                tag
            ))),
        }
    }

    /// Open a single-connection pool and wait until it is connected
    pub async fn connect(database_type: &DatabaseType, url: &str) -> Result<Self> {
        match database_type {
            DatabaseType::Postgres => {
                let pool = PgPoolOptions::new().max_connections(1).connect(url).await?;
                Ok(DatabaseConnection::Postgres(pool))
            }
            DatabaseType::Mysql | DatabaseType::JdbcMysql => {
                let pool = MySqlPoolOptions::new().max_connections(1).connect(url).await?;
                Ok(DatabaseConnection::MySql(pool))
            }
            DatabaseType::Sqlite => {
                let pool = SqlitePoolOptions::new().max_connections(1).connect(url).await?;
                Ok(DatabaseConnection::Sqlite(pool))
            }
            DatabaseType::Other(tag) => Err(Error::DatabaseError(format!(
                "Unsupported database driver: {}",
                tag
            ))),
        }
    }

    /// Execute a SQL statement
    pub async fn execute(&self, sql: &str) -> Result<()> {
        match self {
            DatabaseConnection::Postgres(pool) => {
                sqlx::query(sql).execute(pool).await?;
                Ok(())
            }
            DatabaseConnection::MySql(pool) => {
                sqlx::query(sql).execute(pool).await?;
                Ok(())
            }
            DatabaseConnection::Sqlite(pool) => {
                sqlx::query(sql).execute(pool).await?;
                Ok(())
            }
        }
    }

    pub async fn close(&self) {
        match self {
            DatabaseConnection::Postgres(pool) => pool.close().await,
            DatabaseConnection::MySql(pool) => pool.close().await,
            DatabaseConnection::Sqlite(pool) => pool.close().await,
        }
    }
}

/// A connection descriptor, owned by the caller and borrowed by adapters
#[derive(Debug, Clone)]
pub struct Connection {
    uri: String,
    database_type: DatabaseType,
    parsed: ConnectionUri,
    options: ConnectionOptions,
    handle: Option<DatabaseConnection>,
}

impl Connection {
    /// Build a descriptor around an existing handle
    pub fn new(
        uri: &str,
        database_type: DatabaseType,
        handle: Option<DatabaseConnection>,
    ) -> Result<Self> {
        let parsed = ConnectionUri::parse(uri)?;
        let options = ConnectionOptions::from_uri(&parsed, &database_type);

        Ok(Self {
            uri: uri.to_string(),
            database_type,
            parsed,
            options,
            handle,
        })
    }

    /// Build a descriptor from configuration, with a lazily connected pool.
    /// Dialects sqlx cannot drive get no handle.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let database_type = config
            .database_type
            .as_deref()
            .map(DatabaseType::from_tag)
            .unwrap_or_else(|| DatabaseType::detect(&config.url));

        let pool_size = config.pool_size.unwrap_or(5);
        let timeout = Duration::from_secs(config.timeout_seconds.unwrap_or(30));

        let handle = match database_type {
            DatabaseType::Other(_) => None,
            _ => {
                let driver_url = driver_url(&config.url, &database_type)?;
                Some(DatabaseConnection::connect_lazy(
                    &database_type,
                    &driver_url,
                    pool_size,
                    timeout,
                )?)
            }
        };

        tracing::debug!(database_type = %database_type, "Opened connection descriptor");

        Self::new(&config.url, database_type, handle)
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn parsed_uri(&self) -> &ConnectionUri {
        &self.parsed
    }

    pub fn database_type(&self) -> &DatabaseType {
        &self.database_type
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn handle(&self) -> Option<&DatabaseConnection> {
        self.handle.as_ref()
    }
}

/// The URL handed to sqlx: `jdbc:` stripped and `mysql2` normalized.
///
/// For MySQL the credentials from [`ConnectionUri`] move into the userinfo,
/// since sqlx ignores `user` and `password` query parameters.
pub fn driver_url(uri: &str, database_type: &DatabaseType) -> Result<String> {
    match database_type {
        DatabaseType::Mysql | DatabaseType::JdbcMysql => {
            let parsed = ConnectionUri::parse(uri)?;
            let mut url = parsed.url.clone();
            let invalid = || Error::InvalidUri(format!("cannot use {} as a mysql URI", uri));

            if url.scheme() != "mysql" {
                url.set_scheme("mysql").map_err(|_| invalid())?;
            }
            url.set_username(parsed.user().unwrap_or(""))
                .map_err(|_| invalid())?;
            url.set_password(parsed.password()).map_err(|_| invalid())?;

            let rest: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(key, _)| key != "user" && key != "password")
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();
            if rest.is_empty() {
                url.set_query(None);
            } else {
                url.query_pairs_mut().clear().extend_pairs(rest);
            }

            Ok(url.to_string())
        }
        _ => Ok(uri.strip_prefix(JDBC_PREFIX).unwrap_or(uri).to_string()),
    }
}
