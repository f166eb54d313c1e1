//! Structured-text formats accepted for config files and substitution descriptors.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Strict JSON.
    Json,
    /// JSON5: comments, trailing commas, unquoted keys and single quotes.
    Json5,
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Json5(#[from] json5::Error),
}

#[derive(Debug, Error)]
#[error("unknown format: {0}")]
pub struct UnknownFormat(pub String);

impl Format {
    /// Formats in the order their files are tried.
    pub const ALL: [Format; 2] = [Format::Json, Format::Json5];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Json5 => "json5",
        }
    }

    pub fn parse(self, text: &str) -> Result<Value, FormatError> {
        let parsed: serde_json::Value = match self {
            Format::Json => serde_json::from_str(text)?,
            Format::Json5 => json5::from_str(text)?,
        };
        Ok(Value::from(parsed))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Format::Json),
            "json5" => Ok(Format::Json5),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}
