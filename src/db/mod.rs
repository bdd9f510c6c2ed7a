// Database Module
// Connector registry, connector implementations and the engine layer they delegate to

pub mod connectors;
pub mod engine;
pub mod odbc;
pub mod registry;
pub mod traits;

pub use connectors::{MssqlConnector, PostgresConnector, SqliteConnector};
pub use engine::{create_engine, Engine, EngineError, EnginePool};
pub use odbc::{DriverCatalog, OdbcInstCatalog, StaticDriverCatalog};
pub use registry::{build_connector, ConnectorDescriptor, ConnectorRegistry};
pub use traits::{ConnectionData, Connector, ConnectorError, DatabaseType};
