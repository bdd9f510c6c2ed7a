// Connector Traits
// Defines the core abstraction every database connector implements

use crate::db::engine::{Engine, EngineError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Supported database families
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    Mssql,
    Postgresql,
    Sqlite,
}

impl DatabaseType {
    /// Display name for listings
    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseType::Mssql => "Microsoft SQL Server",
            DatabaseType::Postgresql => "PostgreSQL",
            DatabaseType::Sqlite => "SQLite",
        }
    }

    /// Short family name used in driver messages
    pub fn family(&self) -> &'static str {
        match self {
            DatabaseType::Mssql => "MSSQL",
            DatabaseType::Postgresql => "PostgreSQL",
            DatabaseType::Sqlite => "SQLite",
        }
    }

    /// Default port for the database type
    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseType::Mssql => 1433,
            DatabaseType::Postgresql => 5432,
            DatabaseType::Sqlite => 0, // File-based, no port
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.family())
    }
}

/// Common connector error type
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("Unsupported connector: {0}")]
    UnsupportedConnector(String),

    #[error("Connector already registered: {0}")]
    DuplicateConnector(String),

    #[error("Missing connection key: {0}")]
    MissingKey(String),

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("No {0} driver found. Please install a driver for {0}.")]
    NoDriverFound(DatabaseType),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Connection data handed to a connector
///
/// An untyped map of scalar values. Connectors decide which keys they read;
/// nothing is checked until a key is actually used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionData {
    values: BTreeMap<String, Value>,
}

impl ConnectionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read a required key rendered as a string
    pub fn require(&self, key: &str) -> Result<String, ConnectorError> {
        self.optional(key)?
            .ok_or_else(|| ConnectorError::MissingKey(key.to_string()))
    }

    /// Read an optional key rendered as a string
    pub fn optional(&self, key: &str) -> Result<Option<String>, ConnectorError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(_) => Err(ConnectorError::InvalidConfig(format!(
                "value for '{}' must be a scalar",
                key
            ))),
        }
    }

    /// Read an optional boolean flag; accepts `true`/`false` and their string forms
    pub fn optional_bool(&self, key: &str) -> Result<Option<bool>, ConnectorError> {
        match self.optional(key)? {
            None => Ok(None),
            Some(raw) => parse_flag(&raw).map(Some).ok_or_else(|| {
                ConnectorError::InvalidConfig(format!(
                    "value for '{}' must be a boolean, got '{}'",
                    key, raw
                ))
            }),
        }
    }
}

/// Parse a boolean flag written as `true`/`yes`/`1` or `false`/`no`/`0`
pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

impl<K, V> FromIterator<(K, V)> for ConnectionData
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Connector trait - every database connector implements this
///
/// A connector only stores what it was built with. All work happens in
/// [`Connector::create_connection`], which the caller invokes when it needs
/// an engine.
pub trait Connector: Send + Sync + fmt::Debug {
    /// Construct a connector from its registry name and connection data
    fn new(name: String, connection_data: ConnectionData) -> Self
    where
        Self: Sized;

    /// Translate the connection data into an engine handle
    fn create_connection(&self) -> Result<Engine, ConnectorError>;

    /// Name the connector was built under
    fn name(&self) -> &str;

    fn connection_data(&self) -> &ConnectionData;

    /// Database family this connector targets
    fn database_type(&self) -> DatabaseType;

    /// Allow downcasting for connector-specific options
    fn as_any(&self) -> &dyn std::any::Any;
}
