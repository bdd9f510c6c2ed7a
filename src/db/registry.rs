// Connector Registry
// Maps connector names to constructors and builds connector instances

use crate::db::connectors::{MssqlConnector, PostgresConnector, SqliteConnector};
use crate::db::traits::{ConnectionData, Connector, ConnectorError, DatabaseType};
use std::collections::BTreeMap;
use std::fmt;

/// Constructor function stored in a descriptor
pub type ConnectorConstructor = fn(String, ConnectionData) -> Box<dyn Connector>;

fn construct<C: Connector + 'static>(name: String, connection_data: ConnectionData) -> Box<dyn Connector> {
    Box::new(C::new(name, connection_data))
}

/// Registration entry for one connector implementation
#[derive(Clone, Copy)]
pub struct ConnectorDescriptor {
    pub name: &'static str,
    pub database_type: DatabaseType,
    /// Keys `create_connection` cannot do without
    pub required_keys: &'static [&'static str],
    pub constructor: ConnectorConstructor,
}

impl ConnectorDescriptor {
    /// Describe connector type `C` under an explicit name
    pub fn of<C: Connector + 'static>(
        name: &'static str,
        database_type: DatabaseType,
        required_keys: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            database_type,
            required_keys,
            constructor: construct::<C>,
        }
    }

    pub fn build(&self, name: String, connection_data: ConnectionData) -> Box<dyn Connector> {
        (self.constructor)(name, connection_data)
    }
}

impl fmt::Debug for ConnectorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorDescriptor")
            .field("name", &self.name)
            .field("database_type", &self.database_type)
            .field("required_keys", &self.required_keys)
            .finish()
    }
}

/// Connectors shipped with the crate
pub fn builtin_connectors() -> [ConnectorDescriptor; 3] {
    [
        ConnectorDescriptor::of::<MssqlConnector>(
            "MSSQL",
            DatabaseType::Mssql,
            MssqlConnector::REQUIRED_KEYS,
        ),
        ConnectorDescriptor::of::<PostgresConnector>(
            "PostgreSQL",
            DatabaseType::Postgresql,
            PostgresConnector::REQUIRED_KEYS,
        ),
        ConnectorDescriptor::of::<SqliteConnector>(
            "SQLite",
            DatabaseType::Sqlite,
            SqliteConnector::REQUIRED_KEYS,
        ),
    ]
}

/// Registry of connector implementations
#[derive(Debug, Default, Clone)]
pub struct ConnectorRegistry {
    connectors: BTreeMap<&'static str, ConnectorDescriptor>,
}

impl ConnectorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in connector
    pub fn builtin() -> Result<Self, ConnectorError> {
        let mut registry = Self::new();
        for descriptor in builtin_connectors() {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Register a connector; a name can only be taken once
    pub fn register(&mut self, descriptor: ConnectorDescriptor) -> Result<(), ConnectorError> {
        if self.connectors.contains_key(descriptor.name) {
            return Err(ConnectorError::DuplicateConnector(descriptor.name.to_string()));
        }
        self.connectors.insert(descriptor.name, descriptor);
        tracing::debug!("[Registry] Registered connector: {}", descriptor.name);
        Ok(())
    }

    /// Build a connector by exact, case-sensitive name
    pub fn build(
        &self,
        name: &str,
        connection_data: ConnectionData,
    ) -> Result<Box<dyn Connector>, ConnectorError> {
        let descriptor = self
            .connectors
            .get(name)
            .ok_or_else(|| ConnectorError::UnsupportedConnector(name.to_string()))?;

        tracing::debug!(
            "[Registry] Building {} connector '{}'",
            descriptor.database_type.display_name(),
            name
        );
        Ok(descriptor.build(name.to_string(), connection_data))
    }

    pub fn descriptor(&self, name: &str) -> Option<&ConnectorDescriptor> {
        self.connectors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.connectors.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        self.connectors.keys().copied().collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ConnectorDescriptor> {
        self.connectors.values()
    }
}

/// Build a connector from the built-in registry
///
/// The registry is assembled fresh on every call. Absent connection data is
/// treated as empty.
pub fn build_connector(
    name: &str,
    connection_data: Option<ConnectionData>,
) -> Result<Box<dyn Connector>, ConnectorError> {
    ConnectorRegistry::builtin()?.build(name, connection_data.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::engine::Engine;
    use serde_json::json;

    // Mock connector for testing
    #[derive(Debug)]
    struct MockConnector {
        name: String,
        connection_data: ConnectionData,
    }

    impl Connector for MockConnector {
        fn new(name: String, connection_data: ConnectionData) -> Self {
            Self {
                name,
                connection_data,
            }
        }

        fn create_connection(&self) -> Result<Engine, ConnectorError> {
            Err(ConnectorError::InvalidConfig("Mock".to_string()))
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

    fn mock_descriptor(name: &'static str) -> ConnectorDescriptor {
        ConnectorDescriptor::of::<MockConnector>(name, DatabaseType::Sqlite, &[])
    }

    #[test]
    fn test_builtin_names() {
        let registry = ConnectorRegistry::builtin().unwrap();
        assert_eq!(registry.names(), vec!["MSSQL", "PostgreSQL", "SQLite"]);
        assert!(!registry.contains("Connector"));
        assert!(!registry.contains(""));
    }

    #[test]
    fn test_build_keeps_name_and_data() {
        let data: ConnectionData = [("host", json!("h")), ("port", json!(1433))]
            .into_iter()
            .collect();

        for name in ConnectorRegistry::builtin().unwrap().names() {
            let connector = build_connector(name, Some(data.clone())).unwrap();
            assert_eq!(connector.name(), name);
            assert_eq!(connector.connection_data(), &data);
        }
    }

    #[test]
    fn test_build_dispatches_to_type() {
        let connector = build_connector("MSSQL", None).unwrap();
        assert_eq!(connector.database_type(), DatabaseType::Mssql);
        assert!(connector.as_any().downcast_ref::<MssqlConnector>().is_some());
        assert!(connector.connection_data().is_empty());
    }

    #[test]
    fn test_unsupported_connector() {
        let err = build_connector("does-not-exist", Some(ConnectionData::new())).unwrap_err();
        assert!(matches!(err, ConnectorError::UnsupportedConnector(ref n) if n == "does-not-exist"));
        assert!(err.to_string().contains("does-not-exist"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(matches!(
            build_connector("mssql", None),
            Err(ConnectorError::UnsupportedConnector(_))
        ));
    }

    #[test]
    fn test_register_custom_connector() {
        let mut registry = ConnectorRegistry::new();
        registry.register(mock_descriptor("Mock")).unwrap();

        let connector = registry.build("Mock", ConnectionData::new()).unwrap();
        assert_eq!(connector.name(), "Mock");
        assert!(connector.as_any().downcast_ref::<MockConnector>().is_some());
        assert!(connector.create_connection().is_err());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ConnectorRegistry::builtin().unwrap();
        let err = registry.register(mock_descriptor("MSSQL")).unwrap_err();
        assert!(matches!(err, ConnectorError::DuplicateConnector(ref n) if n == "MSSQL"));

        // The first registration is kept
        let connector = registry.build("MSSQL", ConnectionData::new()).unwrap();
        assert!(connector.as_any().downcast_ref::<MssqlConnector>().is_some());
    }

    #[test]
    fn test_descriptor_metadata() {
        let registry = ConnectorRegistry::builtin().unwrap();
        let mssql = registry.descriptor("MSSQL").unwrap();
        assert_eq!(mssql.database_type, DatabaseType::Mssql);
        assert_eq!(
            mssql.required_keys,
            &["user", "password", "host", "port", "database"]
        );
        assert_eq!(registry.descriptors().count(), 3);
    }
}
