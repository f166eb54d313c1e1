//! Building a config tree from a substitution map and a set of variables.
//!
//! A substitution map mirrors the shape of the config it produces. Each leaf
//! is either the name of a variable whose value is copied verbatim, or a
//! descriptor table asking for the variable to be parsed first:
//!
//! ```json
//! {
//!   "db": {
//!     "password": "DB_PASSWORD",
//!     "options": { "__name": "DB_OPTIONS", "__format": "json" }
//!   }
//! }
//! ```
//!
//! Any table holding both `__name` and `__format` is read as a descriptor,
//! so those two keys cannot be used as ordinary nested keys in a
//! substitution map.

use std::collections::HashMap;

use super::format::Format;
use super::path::{set_path, KeyPath};
use super::value::{Table, Value};
use super::ConfigError;

pub const NAME_KEY: &str = "__name";
pub const FORMAT_KEY: &str = "__format";

/// Builds a new table holding only the paths whose variable is set and non-empty.
pub fn substitute_deep(
    substitution_map: &Table,
    variables: &HashMap<String, String>,
) -> Result<Table, ConfigError> {
    let mut result = Table::new();
    substitute_table(substitution_map, variables, &KeyPath::root(), &mut result)?;
    Ok(result)
}

fn substitute_table(
    map: &Table,
    variables: &HashMap<String, String>,
    path: &KeyPath,
    result: &mut Table,
) -> Result<(), ConfigError> {
    for (key, value) in map {
        substitute_value(value, variables, &path.child(key.as_str()), result)?;
    }
    Ok(())
}

fn substitute_value(
    value: &Value,
    variables: &HashMap<String, String>,
    path: &KeyPath,
    result: &mut Table,
) -> Result<(), ConfigError> {
    match value {
        Value::String(name) => {
            if let Some(resolved) = lookup(variables, name) {
                tracing::trace!(path = %path, variable = %name, "substituting variable");
                set_path(result, path.segments(), Value::String(resolved.to_string()));
            }
            Ok(())
        }
        Value::Table(table) => match descriptor(table, variables) {
            Some((name, raw)) => {
                let parsed = parse_descriptor(table, name, raw)?;
                tracing::trace!(path = %path, variable = %name, "substituting parsed variable");
                set_path(result, path.segments(), parsed);
                Ok(())
            }
            None => substitute_table(table, variables, path, result),
        },
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                substitute_value(item, variables, &path.child(index.to_string()), result)?;
            }
            Ok(())
        }
        other => Err(ConfigError::IllegalSubstitutionLeaf {
            path: parent_of(path).to_string(),
            type_name: other.type_name(),
        }),
    }
}

fn lookup<'a>(variables: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    variables
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Returns the variable name and raw value when `table` is a descriptor
/// whose variable is set and non-empty.
fn descriptor<'a>(
    table: &'a Table,
    variables: &'a HashMap<String, String>,
) -> Option<(&'a str, &'a str)> {
    if !table.contains_key(FORMAT_KEY) {
        return None;
    }
    let name = table.get(NAME_KEY)?.as_str()?;
    lookup(variables, name).map(|raw| (name, raw))
}

fn parse_descriptor(table: &Table, name: &str, raw: &str) -> Result<Value, ConfigError> {
    let parse_error = |format: String, message: String| ConfigError::SubstitutionParse {
        variable: name.to_string(),
        format,
        message,
    };

    let tag = match table.get(FORMAT_KEY) {
        Some(Value::String(tag)) => tag.as_str(),
        Some(other) => {
            return Err(parse_error(
                other.type_name().to_string(),
                format!("format tag must be a string, found {}", other.type_name()),
            ))
        }
        None => return Err(parse_error(String::new(), "missing format tag".to_string())),
    };

    let format = tag
        .parse::<Format>()
        .map_err(|e| parse_error(tag.to_string(), e.to_string()))?;

    format
        .parse(raw)
        .map_err(|e| parse_error(tag.to_string(), e.to_string()))
}

/// Illegal leaves are reported against the table that holds them.
fn parent_of(path: &KeyPath) -> KeyPath {
    let segments = path.segments();
    KeyPath::from(segments[..segments.len().saturating_sub(1)].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_table(value: serde_json::Value) -> Table {
        match Value::from(value) {
            Value::Table(t) => t,
            other => panic!("expected table, got {}", other.type_name()),
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_plain_variable() {
        let map = make_table(json!({"db": {"host": "DB_HOST"}}));
        let result = substitute_deep(&map, &vars(&[("DB_HOST", "localhost")])).unwrap();
        assert_eq!(result, make_table(json!({"db": {"host": "localhost"}})));
    }

    #[test]
    fn test_empty_variable_is_omitted() {
        let map = make_table(json!({"db": {"host": "DB_HOST"}}));
        let result = substitute_deep(&map, &vars(&[("DB_HOST", "")])).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_missing_variable_is_omitted() {
        let map = make_table(json!({"db": {"host": "DB_HOST", "port": "DB_PORT"}}));
        let result = substitute_deep(&map, &vars(&[("DB_PORT", "5432")])).unwrap();
        assert_eq!(result, make_table(json!({"db": {"port": "5432"}})));
    }

    #[test]
    fn test_json_descriptor() {
        let map = make_table(json!({"opts": {"__name": "OPTS", "__format": "json"}}));
        let result = substitute_deep(&map, &vars(&[("OPTS", r#"{"a":1}"#)])).unwrap();
        assert_eq!(result, make_table(json!({"opts": {"a": 1}})));
    }

    #[test]
    fn test_json5_descriptor() {
        let map = make_table(json!({"opts": {"__name": "OPTS", "__format": "json5"}}));
        let result = substitute_deep(&map, &vars(&[("OPTS", "{a: 'x', b: [1,],}")])).unwrap();
        assert_eq!(result, make_table(json!({"opts": {"a": "x", "b": [1]}})));
    }

    #[test]
    fn test_descriptor_scalar_value() {
        let map = make_table(json!({"port": {"__name": "PORT", "__format": "json"}}));
        let result = substitute_deep(&map, &vars(&[("PORT", "8080")])).unwrap();
        assert_eq!(result, make_table(json!({"port": 8080})));
    }

    #[test]
    fn test_malformed_descriptor_value_names_variable() {
        let map = make_table(json!({"opts": {"__name": "OPTS", "__format": "json"}}));
        let err = substitute_deep(&map, &vars(&[("OPTS", "{not json")])).unwrap_err();
        assert!(matches!(err, ConfigError::SubstitutionParse { .. }));
        let message = err.to_string();
        assert!(message.contains("OPTS"), "{message}");
        assert!(message.contains("json"), "{message}");
    }

    #[test]
    fn test_unknown_format_is_parse_error() {
        let map = make_table(json!({"opts": {"__name": "OPTS", "__format": "yaml"}}));
        let err = substitute_deep(&map, &vars(&[("OPTS", "a: 1")])).unwrap_err();
        match err {
            ConfigError::SubstitutionParse { variable, format, .. } => {
                assert_eq!(variable, "OPTS");
                assert_eq!(format, "yaml");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_string_format_tag_is_parse_error() {
        let map = make_table(json!({"opts": {"__name": "OPTS", "__format": 5}}));
        let err = substitute_deep(&map, &vars(&[("OPTS", "{}")])).unwrap_err();
        match err {
            ConfigError::SubstitutionParse { variable, format, message } => {
                assert_eq!(variable, "OPTS");
                assert_eq!(format, "integer");
                assert!(message.contains("must be a string"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unset_descriptor_is_walked_as_table() {
        let map = make_table(json!({"opts": {"__name": "OPTS", "__format": "json"}}));
        let result = substitute_deep(&map, &vars(&[])).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_illegal_leaf_names_path_and_type() {
        let map = make_table(json!({"server": {"port": 8080}}));
        let err = substitute_deep(&map, &vars(&[])).unwrap_err();
        match &err {
            ConfigError::IllegalSubstitutionLeaf { path, type_name } => {
                assert_eq!(path, "server");
                assert_eq!(*type_name, "integer");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("server"));
    }

    #[test]
    fn test_null_leaf_is_illegal() {
        let map = make_table(json!({"a": null}));
        let err = substitute_deep(&map, &vars(&[])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::IllegalSubstitutionLeaf { type_name: "null", .. }
        ));
    }

    #[test]
    fn test_array_entries_use_index_keys() {
        let map = make_table(json!({"hosts": ["HOST_A", "HOST_B"]}));
        let result = substitute_deep(&map, &vars(&[("HOST_B", "b.example")])).unwrap();
        assert_eq!(result, make_table(json!({"hosts": {"1": "b.example"}})));
    }
}
