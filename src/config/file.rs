//! Reading config files from disk.

use std::path::Path;

use super::format::Format;
use super::value::{Table, Value};
use super::ConfigError;

/// Loads and parses a config file.
///
/// Returns `Ok(None)` if the file doesn't exist. The document must hold a
/// table at its root.
pub fn load_file(path: &Path, format: Format) -> Result<Option<Table>, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let value = format
        .parse(&contents)
        .map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            format,
            source: e,
        })?;

    match value {
        Value::Table(table) => Ok(Some(table)),
        _ => Err(ConfigError::NotATable(path.to_path_buf())),
    }
}
