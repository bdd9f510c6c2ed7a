// SQLite Engine
// File-based engine for sqlite:// URLs (no pooling needed - single writer)

use super::{decode, EngineBackend, EngineError, EnginePool};
use crate::db::traits::DatabaseType;
use rusqlite::{Connection as RusqliteConnection, OpenFlags};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Where a SQLite engine keeps its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
    Memory,
    File(PathBuf),
}

/// SQLite half of an engine
#[derive(Debug)]
pub struct SqliteBackend {
    target: SqliteTarget,
}

impl SqliteBackend {
    /// `sqlite://` is in-memory, `sqlite:///rel.db` is relative and
    /// `sqlite:////abs/path.db` is absolute
    pub fn from_url(url: &Url) -> Result<Self, EngineError> {
        if url.host_str().is_some_and(|h| !h.is_empty()) {
            return Err(EngineError::InvalidUrl(
                "SQLite URLs take no host; use sqlite:///path".to_string(),
            ));
        }

        let decoded = decode(url.path());
        let path = decoded.strip_prefix('/').unwrap_or(&decoded);

        let target = if path.is_empty() || path == ":memory:" {
            SqliteTarget::Memory
        } else {
            SqliteTarget::File(PathBuf::from(path))
        };

        Ok(Self { target })
    }

    pub fn target(&self) -> &SqliteTarget {
        &self.target
    }

    fn open_connection(&self) -> Result<RusqliteConnection, EngineError> {
        let conn = match &self.target {
            SqliteTarget::Memory => RusqliteConnection::open_in_memory()?,
            SqliteTarget::File(path) => RusqliteConnection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            )?,
        };
        Ok(conn)
    }
}

#[async_trait::async_trait]
impl EngineBackend for SqliteBackend {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    async fn open(&self) -> Result<EnginePool, EngineError> {
        let conn = self.open_connection()?;
        Ok(EnginePool::Sqlite(Arc::new(tokio::sync::Mutex::new(conn))))
    }

    async fn test_connection(&self) -> Result<bool, EngineError> {
        let conn = self.open_connection()?;
        let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(one == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str) -> SqliteTarget {
        SqliteBackend::from_url(&Url::parse(url).unwrap())
            .unwrap()
            .target()
            .clone()
    }

    #[test]
    fn test_url_targets() {
        assert_eq!(target("sqlite://"), SqliteTarget::Memory);
        assert_eq!(target("sqlite:///:memory:"), SqliteTarget::Memory);
        assert_eq!(
            target("sqlite:///data/app.db"),
            SqliteTarget::File(PathBuf::from("data/app.db"))
        );
        assert_eq!(
            target("sqlite:////var/lib/app.db"),
            SqliteTarget::File(PathBuf::from("/var/lib/app.db"))
        );
        assert_eq!(
            target("sqlite:////tmp/my%20data.db"),
            SqliteTarget::File(PathBuf::from("/tmp/my data.db"))
        );
    }

    #[test]
    fn test_host_rejected() {
        let url = Url::parse("sqlite://somehost/app.db").unwrap();
        assert!(matches!(
            SqliteBackend::from_url(&url),
            Err(EngineError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.db");
        let url = Url::parse(&format!("sqlite:///{}", path.display())).unwrap();

        let backend = SqliteBackend::from_url(&url).unwrap();
        assert!(backend.test_connection().await.unwrap());
        assert!(path.exists());
    }
}
