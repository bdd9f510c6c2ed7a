// PostgreSQL Engine
// tokio-postgres configuration and bb8 pooling for postgresql:// URLs

use super::{EngineBackend, EngineError, EnginePool};
use crate::db::traits::DatabaseType;
use bb8::Pool;
use bb8_postgres::PostgresConnectionManager;
use std::sync::Arc;
use tokio_postgres::{Config, NoTls};
use url::Url;

pub type PostgresPool = Pool<PostgresConnectionManager<NoTls>>;

const POOL_MAX_SIZE: u32 = 10;

/// PostgreSQL half of an engine
pub struct PostgresBackend {
    config: Config,
}

impl PostgresBackend {
    /// Parse the URL with tokio-postgres, which understands the libpq URI format
    pub fn from_url(url: &Url) -> Result<Self, EngineError> {
        let config = url.as_str().parse::<Config>()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[async_trait::async_trait]
impl EngineBackend for PostgresBackend {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgresql
    }

    async fn open(&self) -> Result<EnginePool, EngineError> {
        let manager = PostgresConnectionManager::new(self.config.clone(), NoTls);

        let pool = Pool::builder()
            .max_size(POOL_MAX_SIZE)
            .build(manager)
            .await?;

        Ok(EnginePool::Postgres(Arc::new(pool)))
    }

    async fn test_connection(&self) -> Result<bool, EngineError> {
        let (client, connection) = self.config.connect(NoTls).await?;

        // The connection object drives the socket; it must be polled for the client to work
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!("PostgreSQL test connection closed with error: {}", e);
            }
        });

        client.simple_query("SELECT 1").await?;
        drop(client);
        if let Err(e) = driver.await {
            tracing::warn!("PostgreSQL test connection task failed: {}", e);
        }

        Ok(true)
    }
}
