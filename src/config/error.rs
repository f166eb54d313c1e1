use std::path::PathBuf;
use thiserror::Error;

use super::format::{Format, FormatError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}' as {format}: {source}")]
    ParseError {
        path: PathBuf,
        format: Format,
        source: FormatError,
    },

    #[error("config file '{0}' does not contain a table at its root")]
    NotATable(PathBuf),

    #[error("__format parser error in {variable} ({format}): {message}")]
    SubstitutionParse {
        variable: String,
        format: String,
        message: String,
    },

    #[error("illegal key type for substitution map at {path}: {type_name}")]
    IllegalSubstitutionLeaf {
        path: String,
        type_name: &'static str,
    },

    #[error("configuration property \"{0}\" is not defined")]
    NotDefined(String),

    #[error("failed to deserialize configuration property \"{path}\": {source}")]
    Deserialize {
        path: String,
        source: serde_json::Error,
    },

    #[error("configuration property \"{0}\" holds a pending value that has not resolved")]
    Unresolved(String),
}
