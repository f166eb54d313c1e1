//! In-memory representation of a configuration tree.
//!
//! Values parsed from files only ever use the plain variants. The [`Atomic`]
//! variants can only come from values built in code and merged in with
//! [`extend_deep`](super::extend_deep); the merge never looks inside them.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt, Shared};
use regex::Regex;
use toml::value::Datetime;

/// A mapping from key to value. Keys are unique per table.
pub type Table = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Table(Table),
    Atomic(Atomic),
}

/// Values that are assigned whole during a merge, never recursed into.
#[derive(Debug, Clone)]
pub enum Atomic {
    Date(Datetime),
    Regex(Regex),
    Pending(Pending),
}

impl PartialEq for Atomic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Atomic::Date(a), Atomic::Date(b)) => a == b,
            (Atomic::Regex(a), Atomic::Regex(b)) => a.as_str() == b.as_str(),
            (Atomic::Pending(a), Atomic::Pending(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// A value whose computation has not finished yet.
///
/// Clones share the same underlying future, so identity survives merging.
#[derive(Clone)]
pub struct Pending(Shared<BoxFuture<'static, Value>>);

impl Pending {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Value> + Send + 'static,
    {
        Self(future.boxed().shared())
    }

    /// Returns a future that completes with the computed value.
    pub fn resolve(&self) -> impl Future<Output = Value> + Send + 'static {
        self.0.clone()
    }

    /// Returns the computed value if some clone has already driven it to completion.
    pub fn peek(&self) -> Option<&Value> {
        self.0.peek()
    }

    /// Whether both handles refer to the same computation.
    pub fn ptr_eq(&self, other: &Pending) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.peek() {
            Some(value) => f.debug_tuple("Pending").field(value).finish(),
            None => f.write_str("Pending(<unresolved>)"),
        }
    }
}

impl Value {
    /// Name of the variant, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
            Value::Atomic(Atomic::Date(_)) => "date",
            Value::Atomic(Atomic::Regex(_)) => "regex",
            Value::Atomic(Atomic::Pending(_)) => "pending",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Converts the value to JSON.
    ///
    /// Dates and regexes become strings and pending values their output.
    /// Returns `None` if any pending value inside has not resolved yet.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        Some(match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<Option<_>>()?,
            ),
            Value::Table(table) => serde_json::Value::Object(
                table
                    .iter()
                    .map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                    .collect::<Option<_>>()?,
            ),
            Value::Atomic(Atomic::Date(dt)) => serde_json::Value::String(dt.to_string()),
            Value::Atomic(Atomic::Regex(re)) => serde_json::Value::String(re.as_str().to_string()),
            Value::Atomic(Atomic::Pending(p)) => p.peek()?.to_json()?,
        })
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Table(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Value::Table(table)
    }
}

impl From<Datetime> for Value {
    fn from(dt: Datetime) -> Self {
        Value::Atomic(Atomic::Date(dt))
    }
}

impl From<Regex> for Value {
    fn from(re: Regex) -> Self {
        Value::Atomic(Atomic::Regex(re))
    }
}

impl From<Pending> for Value {
    fn from(p: Pending) -> Self {
        Value::Atomic(Atomic::Pending(p))
    }
}
