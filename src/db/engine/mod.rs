// Engine Layer
// Turns a connection URL into a lazily connecting engine handle

pub mod mssql;
pub mod postgres;
pub mod sqlite;

use crate::db::traits::DatabaseType;
use percent_encoding::percent_decode_str;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use url::Url;

pub use mssql::{MssqlBackend, MssqlPool, MssqlSettings};
pub use postgres::{PostgresBackend, PostgresPool};
pub use sqlite::{SqliteBackend, SqliteTarget};

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported engine dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Password expired. Please change your password using another tool properly.")]
    PasswordExpired,

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Live connection resources owned by an engine
pub enum EnginePool {
    Mssql(Arc<MssqlPool>),
    Postgres(Arc<PostgresPool>),
    Sqlite(Arc<tokio::sync::Mutex<rusqlite::Connection>>),
}

impl EnginePool {
    /// Check out a connection to see if the backend still answers
    pub async fn is_alive(&self) -> bool {
        match self {
            EnginePool::Mssql(pool) => pool.get().await.is_ok(),
            EnginePool::Postgres(pool) => pool.get().await.is_ok(),
            EnginePool::Sqlite(conn) => conn
                .lock()
                .await
                .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .is_ok(),
        }
    }
}

impl fmt::Debug for EnginePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            EnginePool::Mssql(_) => "Mssql",
            EnginePool::Postgres(_) => "Postgres",
            EnginePool::Sqlite(_) => "Sqlite",
        };
        f.debug_tuple("EnginePool").field(&kind).finish()
    }
}

/// Dialect-specific half of an engine
#[async_trait::async_trait]
pub trait EngineBackend: Send + Sync {
    fn database_type(&self) -> DatabaseType;

    /// Open the pool (or file handle) backing the engine
    async fn open(&self) -> Result<EnginePool, EngineError>;

    /// Make a fresh, unpooled round trip to the server
    async fn test_connection(&self) -> Result<bool, EngineError>;
}

/// Engine handle returned by connectors
///
/// Creating an engine never touches the network. The pool is opened on the
/// first call to [`Engine::connect`] and reused afterwards.
pub struct Engine {
    id: String,
    url: Url,
    driver: Option<String>,
    backend: Box<dyn EngineBackend>,
    pool: OnceCell<EnginePool>,
}

impl Engine {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn database_type(&self) -> DatabaseType {
        self.backend.database_type()
    }

    /// The `driver` query parameter the engine was created with, if any
    pub fn driver(&self) -> Option<&str> {
        self.driver.as_deref()
    }

    /// Full URL, password included
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL with the password masked, safe for logs
    pub fn redacted_url(&self) -> String {
        redact_url(&self.url)
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }

    /// Connected resources, if [`Engine::connect`] already succeeded
    pub fn pool(&self) -> Option<&EnginePool> {
        self.pool.get()
    }

    /// Open the backing pool on first use
    pub async fn connect(&self) -> Result<&EnginePool, EngineError> {
        self.pool
            .get_or_try_init(|| async {
                tracing::info!(
                    "Opening {} engine {} ({})",
                    self.database_type(),
                    self.id,
                    self.redacted_url()
                );
                self.backend.open().await
            })
            .await
    }

    pub async fn test_connection(&self) -> Result<bool, EngineError> {
        self.backend.test_connection().await
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("id", &self.id)
            .field("database_type", &self.database_type())
            .field("url", &self.redacted_url())
            .field("driver", &self.driver)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Build an engine from a connection URL
///
/// The scheme picks the backend: `mssql`, `postgresql` (or `postgres`) and
/// `sqlite`. Backend configuration is parsed here so malformed URLs fail
/// before any connection attempt.
pub fn create_engine(url: &str) -> Result<Engine, EngineError> {
    let url = Url::parse(url).map_err(|e| EngineError::InvalidUrl(e.to_string()))?;

    let backend: Box<dyn EngineBackend> = match url.scheme() {
        "mssql" => Box::new(MssqlBackend::from_url(&url)?),
        "postgresql" | "postgres" => Box::new(PostgresBackend::from_url(&url)?),
        "sqlite" => Box::new(SqliteBackend::from_url(&url)?),
        other => return Err(EngineError::UnsupportedDialect(other.to_string())),
    };

    let engine = Engine {
        id: uuid::Uuid::new_v4().to_string(),
        driver: query_param(&url, "driver"),
        url,
        backend,
        pool: OnceCell::new(),
    };

    tracing::debug!(
        "Created {} engine {} for {}",
        engine.database_type(),
        engine.id,
        engine.redacted_url()
    );

    Ok(engine)
}

/// First value of a query parameter, form-decoded
pub(crate) fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Percent-decode a URL component
pub(crate) fn decode(component: &str) -> String {
    percent_decode_str(component).decode_utf8_lossy().into_owned()
}

fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    if redacted.password().is_some() {
        let _ = redacted.set_password(Some("***"));
    }
    redacted.to_string()
}
