//! Dotted paths into a configuration tree.

use std::fmt;

use super::value::{Table, Value};

/// An ordered list of keys identifying a location in a [`Table`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }
}

impl From<&str> for KeyPath {
    fn from(dotted: &str) -> Self {
        Self {
            segments: dotted.split('.').map(str::to_string).collect(),
        }
    }
}

impl From<&String> for KeyPath {
    fn from(dotted: &String) -> Self {
        KeyPath::from(dotted.as_str())
    }
}

impl From<Vec<String>> for KeyPath {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl From<&[&str]> for KeyPath {
    fn from(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl<const N: usize> From<[&str; N]> for KeyPath {
    fn from(segments: [&str; N]) -> Self {
        KeyPath::from(&segments[..])
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Sets `value` at `path`, creating intermediate tables as needed.
///
/// A `Null` value or an empty path leaves `target` untouched. An existing
/// intermediate value that is not a table is never replaced, so the write
/// is dropped.
pub fn set_path(target: &mut Table, path: &[String], value: Value) {
    if value.is_null() {
        return;
    }

    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        target.insert(first.clone(), value);
        return;
    }

    match target
        .entry(first.clone())
        .or_insert_with(|| Value::Table(Table::new()))
    {
        Value::Table(nested) => set_path(nested, rest, value),
        other => {
            tracing::trace!(
                key = %first,
                found = other.type_name(),
                "not descending into non-table value"
            );
        }
    }
}

/// Looks up the value at `path`.
///
/// Tables are indexed by key and arrays by numeric segment. Traversal
/// through any other value, `Null` included, finds nothing.
pub fn get_path(table: &Table, path: impl Into<KeyPath>) -> Option<&Value> {
    let path = path.into();
    let (first, rest) = path.segments().split_first()?;
    let mut current = table.get(first)?;

    for segment in rest {
        current = match current {
            Value::Table(t) => t.get(segment)?,
            Value::Array(items) => items.get(array_index(segment)?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Parses a segment written exactly as an array index would print.
///
/// Leading zeros and signs are rejected, so `"01"` and `"+1"` name no element.
fn array_index(segment: &str) -> Option<usize> {
    let canonical = segment == "0"
        || (!segment.is_empty()
            && !segment.starts_with('0')
            && segment.bytes().all(|b| b.is_ascii_digit()));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}
