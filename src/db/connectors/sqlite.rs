// SQLite Connector
// Maps a database file path onto a sqlite:// URL

use super::encode_path;
use crate::db::engine::{create_engine, Engine};
use crate::db::traits::{ConnectionData, Connector, ConnectorError, DatabaseType};
use std::path::Path;

#[derive(Debug)]
pub struct SqliteConnector {
    name: String,
    connection_data: ConnectionData,
}

impl SqliteConnector {
    pub const REQUIRED_KEYS: &'static [&'static str] = &["database"];

    /// Extract database path from the connection data
    fn database_path(&self) -> Result<String, ConnectorError> {
        let database = self.connection_data.require("database")?;
        if database.is_empty() {
            return Err(ConnectorError::InvalidConfig(
                "SQLite database path is required".to_string(),
            ));
        }

        // Expand ~ to home directory if present
        let path = match database.strip_prefix("~/") {
            Some(rest) => match std::env::var_os("HOME") {
                Some(home) => Path::new(&home).join(rest).to_string_lossy().to_string(),
                None => database.clone(),
            },
            None => database.clone(),
        };

        Ok(path)
    }

    pub fn connection_string(&self) -> Result<String, ConnectorError> {
        let path = self.database_path()?;
        if path == ":memory:" {
            return Ok("sqlite://".to_string());
        }
        Ok(format!("sqlite:///{}", encode_path(&path)))
    }
}

impl Connector for SqliteConnector {
    fn new(name: String, connection_data: ConnectionData) -> Self {
        Self {
            name,
            connection_data,
        }
    }

    fn create_connection(&self) -> Result<Engine, ConnectorError> {
        let engine = create_engine(&self.connection_string()?)?;
        Ok(engine)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn connection_data(&self) -> &ConnectionData {
        &self.connection_data
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
