// PostgreSQL Connector
// Builds a postgresql:// URL for the engine layer; no local driver is needed

use super::{encode_segment, encode_userinfo};
use crate::db::engine::{create_engine, Engine};
use crate::db::traits::{ConnectionData, Connector, ConnectorError, DatabaseType};
use std::fmt;
use url::form_urlencoded;

pub struct PostgresConnector {
    name: String,
    connection_data: ConnectionData,
}

impl PostgresConnector {
    pub const REQUIRED_KEYS: &'static [&'static str] = &["user", "host", "database"];

    pub fn connection_string(&self) -> Result<String, ConnectorError> {
        let data = &self.connection_data;
        let user = data.require("user")?;
        let host = data.require("host")?;
        let database = data.require("database")?;
        let port = data
            .optional("port")?
            .unwrap_or_else(|| DatabaseType::Postgresql.default_port().to_string());

        let userinfo = match data.optional("password")? {
            Some(password) => format!("{}:{}", encode_userinfo(&user), encode_userinfo(&password)),
            None => encode_userinfo(&user),
        };

        let mut url = format!(
            "postgresql://{}@{}:{}/{}",
            userinfo,
            host,
            port,
            encode_segment(&database)
        );

        if let Some(sslmode) = data.optional("sslmode")? {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("sslmode", &sslmode)
                .finish();
            url.push('?');
            url.push_str(&query);
        }

        Ok(url)
    }
}

impl Connector for PostgresConnector {
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
        DatabaseType::Postgresql
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl fmt::Debug for PostgresConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConnector")
            .field("name", &self.name)
            .field("keys", &self.connection_data.keys().collect::<Vec<_>>())
            .finish()
    }
}
