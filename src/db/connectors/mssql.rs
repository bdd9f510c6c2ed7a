// MS-SQL Connector
// Builds an mssql:// URL, resolves a local ODBC driver and hands both to the engine layer

use super::{encode_segment, encode_userinfo};
use crate::db::engine::{create_engine, Engine};
use crate::db::odbc::{resolve_driver, DriverCatalog, OdbcInstCatalog};
use crate::db::traits::{ConnectionData, Connector, ConnectorError, DatabaseType};
use std::fmt;
use std::sync::Arc;
use url::form_urlencoded;

/// MS-SQL connector
pub struct MssqlConnector {
    name: String,
    connection_data: ConnectionData,
    driver_catalog: Arc<dyn DriverCatalog>,
}

impl MssqlConnector {
    /// Keys read by [`MssqlConnector::connection_string`], in reading order
    pub const REQUIRED_KEYS: &'static [&'static str] =
        &["user", "password", "host", "port", "database"];

    /// Replace the catalog used to look up installed ODBC drivers
    pub fn with_driver_catalog(mut self, catalog: Arc<dyn DriverCatalog>) -> Self {
        self.driver_catalog = catalog;
        self
    }

    /// Connection URL without the driver parameter
    ///
    /// Values are embedded as given, only characters reserved in URLs are
    /// percent-encoded. A named instance in `host` (`srv\SQLEXPRESS`) is left
    /// out of the authority, see [`MssqlConnector::instance`].
    pub fn connection_string(&self) -> Result<String, ConnectorError> {
        let data = &self.connection_data;
        let user = data.require("user")?;
        let password = data.require("password")?;
        let host = data.require("host")?;
        let port = data.require("port")?;
        let database = data.require("database")?;

        Ok(format!(
            "mssql://{}:{}@{}:{}/{}",
            encode_userinfo(&user),
            encode_userinfo(&password),
            split_instance(&host).0,
            port,
            encode_segment(&database)
        ))
    }

    /// Instance name given as `host\INSTANCE`, if any
    pub fn instance(&self) -> Result<Option<String>, ConnectorError> {
        Ok(self
            .connection_data
            .optional("host")?
            .and_then(|host| split_instance(&host).1.map(str::to_string)))
    }

    /// An explicit `driver` key wins over enumeration
    fn resolve_driver(&self) -> Result<String, ConnectorError> {
        match self.connection_data.optional("driver")? {
            Some(driver) => Ok(driver),
            None => resolve_driver(self.driver_catalog.as_ref(), DatabaseType::Mssql),
        }
    }
}

impl Connector for MssqlConnector {
    fn new(name: String, connection_data: ConnectionData) -> Self {
        Self {
            name,
            connection_data,
            driver_catalog: Arc::new(OdbcInstCatalog::from_env()),
        }
    }

    fn create_connection(&self) -> Result<Engine, ConnectorError> {
        let connection_string = self.connection_string()?;
        let driver = self.resolve_driver()?;

        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("driver", &driver);
        if let Some(instance) = self.instance()? {
            query.append_pair("instance", &instance);
        }
        if let Some(encrypt) = self.connection_data.optional_bool("encrypt")? {
            query.append_pair("encrypt", if encrypt { "true" } else { "false" });
        }
        if let Some(trust) = self
            .connection_data
            .optional_bool("trust_server_certificate")?
        {
            query.append_pair("trust_server_certificate", if trust { "true" } else { "false" });
        }

        tracing::debug!("[{}] Using ODBC driver '{}'", self.name, driver);

        let engine = create_engine(&format!("{}?{}", connection_string, query.finish()))?;
        Ok(engine)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn connection_data(&self) -> &ConnectionData {
        &self.connection_data
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mssql
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn split_instance(host: &str) -> (&str, Option<&str>) {
    match host.split_once('\\') {
        Some((server, instance)) if !instance.is_empty() => (server, Some(instance)),
        Some((server, _)) => (server, None),
        None => (host, None),
    }
}

impl fmt::Debug for MssqlConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MssqlConnector")
            .field("name", &self.name)
            .field("keys", &self.connection_data.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
