// Connector Factory
// Builds database connectors by name and turns them into lazily connecting engines

pub mod db;
pub mod profiles;

pub use db::{
    build_connector, create_engine, ConnectionData, Connector, ConnectorDescriptor, ConnectorError,
    ConnectorRegistry, DatabaseType, DriverCatalog, Engine, EngineError,
};
pub use profiles::{get_default_profiles_path, ConnectionProfile, ProfileError, ProfileStore};
