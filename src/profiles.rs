// Connection Profiles
// Named connector + connection data pairs loaded from a TOML file

use crate::db::{build_connector, ConnectionData, Connector, ConnectorError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profiles from {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid profiles file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Profile not found: {0}")]
    NotFound(String),
    #[error("Failed to get config directory")]
    ConfigDir,
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

pub type ProfileResult<T> = Result<T, ProfileError>;

/// One named connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Registry name of the connector, e.g. `MSSQL`
    pub connector: String,
    #[serde(default)]
    pub connection_data: Option<ConnectionData>,
}

impl ConnectionProfile {
    /// Build the connector this profile describes
    pub fn build(&self) -> ProfileResult<Box<dyn Connector>> {
        Ok(build_connector(&self.connector, self.connection_data.clone())?)
    }
}

/// All profiles from one file
///
/// ```toml
/// [profiles.warehouse]
/// connector = "MSSQL"
///
/// [profiles.warehouse.connection_data]
/// user = "sa"
/// password = "secret"
/// host = "db.local"
/// port = 1433
/// database = "sales"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileStore {
    #[serde(default)]
    pub profiles: BTreeMap<String, ConnectionProfile>,
}

impl ProfileStore {
    pub fn from_toml(contents: &str) -> ProfileResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> ProfileResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_toml(&contents)?;
        tracing::debug!("Loaded {} profiles from {:?}", store.profiles.len(), path);
        Ok(store)
    }

    pub fn get(&self, name: &str) -> ProfileResult<&ConnectionProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

/// Get the default profiles path in the app config directory
pub fn get_default_profiles_path() -> ProfileResult<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "connector-factory", "connector-factory")
        .ok_or(ProfileError::ConfigDir)?;

    Ok(proj_dirs.config_dir().join("profiles.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseType;
    use std::io::Write;

    const SAMPLE: &str = r#"
[profiles.warehouse]
connector = "MSSQL"

[profiles.warehouse.connection_data]
user = "sa"
password = "secret"
host = "db.local"
port = 1433
database = "sales"

[profiles.scratch]
connector = "SQLite"
connection_data = { database = ":memory:" }

[profiles.bare]
connector = "PostgreSQL"
"#;

    #[test]
    fn test_parse_profiles() {
        let store = ProfileStore::from_toml(SAMPLE).unwrap();
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["bare", "scratch", "warehouse"]);

        let warehouse = store.get("warehouse").unwrap();
        assert_eq!(warehouse.connector, "MSSQL");
        let data = warehouse.connection_data.as_ref().unwrap();
        assert_eq!(data.require("port").unwrap(), "1433");

        assert!(store.get("bare").unwrap().connection_data.is_none());
    }

    #[test]
    fn test_profile_builds_connector() {
        let store = ProfileStore::from_toml(SAMPLE).unwrap();
        let connector = store.get("scratch").unwrap().build().unwrap();
        assert_eq!(connector.name(), "SQLite");
        assert_eq!(connector.database_type(), DatabaseType::Sqlite);
    }

    #[test]
    fn test_unknown_profile() {
        let store = ProfileStore::from_toml(SAMPLE).unwrap();
        assert!(matches!(store.get("nope"), Err(ProfileError::NotFound(ref n)) if n == "nope"));
    }

    #[test]
    fn test_unknown_connector_in_profile() {
        let store = ProfileStore::from_toml("[profiles.x]\nconnector = \"Oracle\"\n").unwrap();
        let err = store.get("x").unwrap().build().unwrap_err();
        assert!(matches!(
            err,
            ProfileError::Connector(ConnectorError::UnsupportedConnector(_))
        ));
        assert_eq!(err.to_string(), "Unsupported connector: Oracle");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let store = ProfileStore::load(file.path()).unwrap();
        assert_eq!(store.profiles.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ProfileStore::load(&dir.path().join("profiles.toml")),
            Err(ProfileError::Io { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ProfileStore::from_toml("[profiles.x]\nconnector = 5\n"),
            Err(ProfileError::Parse(_))
        ));
    }
}
