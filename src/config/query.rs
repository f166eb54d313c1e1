use std::path::PathBuf;

use serde::de::DeserializeOwned;

use super::builder::{ConfigLoader, LoadStage};
use super::path::{get_path, KeyPath};
use super::value::{Table, Value};
use super::ConfigError;

/// A file that contributed to a loaded [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub stage: LoadStage,
}

/// A fully merged configuration.
///
/// Built once by [`ConfigLoader`] and read-only afterwards, so it can be
/// shared across threads without locking.
#[derive(Debug, Clone, Default)]
pub struct Config {
    root: Table,
    environment: Option<String>,
    sources: Vec<SourceInfo>,
}

impl Config {
    /// Loads configuration from `./config` using the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Wraps an already merged table.
    pub fn from_table(root: Table) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    pub(crate) fn new(
        root: Table,
        environment: Option<String>,
        sources: Vec<SourceInfo>,
    ) -> Self {
        Self {
            root,
            environment,
            sources,
        }
    }

    /// Returns the value at a dotted path.
    pub fn get(&self, path: impl Into<KeyPath>) -> Result<&Value, ConfigError> {
        let path = path.into();
        get_path(&self.root, path.clone()).ok_or_else(|| ConfigError::NotDefined(path.to_string()))
    }

    /// Whether a value, `Null` included, exists at the path.
    pub fn has(&self, path: impl Into<KeyPath>) -> bool {
        get_path(&self.root, path).is_some()
    }

    /// Deserializes the value at a path into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: impl Into<KeyPath>) -> Result<T, ConfigError> {
        let path = path.into();
        let json = self
            .get(path.clone())?
            .to_json()
            .ok_or_else(|| ConfigError::Unresolved(path.to_string()))?;
        serde_json::from_value(json).map_err(|e| ConfigError::Deserialize {
            path: path.to_string(),
            source: e,
        })
    }

    /// The environment name the cascade was resolved for.
    ///
    /// `None` when file loading was not permitted or the config was built
    /// with [`from_table`](Self::from_table).
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Files merged during load, in merge order.
    pub fn sources(&self) -> &[SourceInfo] {
        &self.sources
    }

    pub fn as_table(&self) -> &Table {
        &self.root
    }
}
