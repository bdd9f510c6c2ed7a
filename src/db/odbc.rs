// ODBC Driver Catalog
// Enumerates locally installed ODBC drivers for connectors that need one

use crate::db::traits::{ConnectorError, DatabaseType};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const DEFAULT_SYSINI_DIR: &str = "/etc";
const DEFAULT_INST_FILE: &str = "odbcinst.ini";

/// Source of installed driver names
pub trait DriverCatalog: Send + Sync {
    /// List installed drivers in the catalog's own order
    fn drivers(&self) -> Result<Vec<String>, ConnectorError>;
}

/// Driver catalog backed by the unixODBC `odbcinst.ini` file
#[derive(Debug, Clone)]
pub struct OdbcInstCatalog {
    path: PathBuf,
}

impl OdbcInstCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locate `odbcinst.ini` the way unixODBC does (`ODBCSYSINI`, `ODBCINSTINI`)
    ///
    /// Only the unixODBC layout is known. On Windows (drivers live in the
    /// registry) or with a Homebrew unixODBC under `/opt/homebrew/etc`, point
    /// `ODBCSYSINI` at the right directory or set the `driver` key in the
    /// connection data, otherwise the catalog comes back empty and MSSQL
    /// connectors fail with `NoDriverFound`.
    pub fn from_env() -> Self {
        Self::locate(
            std::env::var_os("ODBCSYSINI"),
            std::env::var_os("ODBCINSTINI"),
        )
    }

    /// Build the catalog path from the `ODBCSYSINI` and `ODBCINSTINI` values
    pub fn locate(sysini: Option<OsString>, instini: Option<OsString>) -> Self {
        let dir = sysini
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SYSINI_DIR));
        let file = instini
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INST_FILE));
        Self::new(dir.join(file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for OdbcInstCatalog {
    fn default() -> Self {
        Self::from_env()
    }
}

impl DriverCatalog for OdbcInstCatalog {
    fn drivers(&self) -> Result<Vec<String>, ConnectorError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(parse_odbcinst(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("ODBC driver catalog not found at {:?}", self.path);
                Ok(Vec::new())
            }
            Err(e) => Err(ConnectorError::IoError(e)),
        }
    }
}

/// Fixed list of drivers
#[derive(Debug, Clone, Default)]
pub struct StaticDriverCatalog {
    drivers: Vec<String>,
}

impl StaticDriverCatalog {
    pub fn new<I, S>(drivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            drivers: drivers.into_iter().map(Into::into).collect(),
        }
    }
}

impl DriverCatalog for StaticDriverCatalog {
    fn drivers(&self) -> Result<Vec<String>, ConnectorError> {
        Ok(self.drivers.clone())
    }
}

/// Extract driver section names from `odbcinst.ini` contents
///
/// `[ODBC]` holds global settings and `[ODBC Drivers]` is an index, neither
/// is a driver.
pub fn parse_odbcinst(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix('[')?.strip_suffix(']'))
        .map(str::trim)
        .filter(|name| {
            !name.is_empty()
                && !name.eq_ignore_ascii_case("ODBC")
                && !name.eq_ignore_ascii_case("ODBC Drivers")
        })
        .map(str::to_string)
        .collect()
}

/// Pick the driver to use for a database family: the last one listed
pub fn resolve_driver(
    catalog: &dyn DriverCatalog,
    family: DatabaseType,
) -> Result<String, ConnectorError> {
    catalog
        .drivers()?
        .pop()
        .ok_or(ConnectorError::NoDriverFound(family))
}
