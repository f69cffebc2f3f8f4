//! # Instance Model
//!
//! The structured value validated and filtered by a [`SchemaDocument`].
//!
//! This is the JSON data model plus one extra variant, [`Instance::Timestamp`],
//! for objects built inside the service (storage rows, central API results)
//! that carry real timestamps instead of serialized strings. Input decoded
//! from a request body never produces a `Timestamp`.
//!
//! [`SchemaDocument`]: crate::document::SchemaDocument

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// A structured value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Instance {
    /// JSON `null`. Also the explicit "missing" marker produced by filtering.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(Number),
    /// JSON string.
    String(String),
    /// A native date/time value.
    Timestamp(DateTime<FixedOffset>),
    /// JSON array.
    Array(Vec<Instance>),
    /// JSON object, ordered by key.
    Object(BTreeMap<String, Instance>),
}

impl Instance {
    /// Build an object from `(key, value)` pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Instance)>,
    {
        Instance::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Instance::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Instance::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Instance>> {
        match self {
            Instance::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Instance]> {
        match self {
            Instance::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Member lookup on objects; `None` for absent keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Instance> {
        self.as_object().and_then(|m| m.get(key))
    }

    /// Convert to plain JSON. Timestamps become RFC 3339 strings.
    pub fn to_json(&self) -> Value {
        match self {
            Instance::Null => Value::Null,
            Instance::Bool(b) => Value::Bool(*b),
            Instance::Number(n) => Value::Number(n.clone()),
            Instance::String(s) => Value::String(s.clone()),
            Instance::Timestamp(ts) => Value::String(render_timestamp(ts)),
            Instance::Array(items) => Value::Array(items.iter().map(Instance::to_json).collect()),
            Instance::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Compare against a schema literal (`enum` members). Timestamps never
    /// equal a literal; numbers compare by value so `1` equals `1.0`.
    pub fn equals_json(&self, other: &Value) -> bool {
        match (self, other) {
            (Instance::Null, Value::Null) => true,
            (Instance::Bool(a), Value::Bool(b)) => a == b,
            (Instance::Number(a), Value::Number(b)) => numbers_equal(a, b),
            (Instance::String(a), Value::String(b)) => a == b,
            (Instance::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals_json(y))
            }
            (Instance::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.equals_json(other)))
            }
            _ => false,
        }
    }

    /// Structural equality used by `uniqueItems`; numbers compare by value.
    pub fn same_as(&self, other: &Instance) -> bool {
        match (self, other) {
            (Instance::Number(a), Instance::Number(b)) => numbers_equal(a, b),
            (Instance::Array(a), Instance::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            (Instance::Object(a), Instance::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.same_as(other)))
            }
            _ => self == other,
        }
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => match (a.as_u64(), b.as_u64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
    }
}

fn render_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl From<Value> for Instance {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Instance::Null,
            Value::Bool(b) => Instance::Bool(b),
            Value::Number(n) => Instance::Number(n),
            Value::String(s) => Instance::String(s),
            Value::Array(items) => Instance::Array(items.into_iter().map(Instance::from).collect()),
            Value::Object(map) => {
                Instance::Object(map.into_iter().map(|(k, v)| (k, Instance::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for Instance {
    fn from(value: &Value) -> Self {
        Instance::from(value.clone())
    }
}

impl From<&str> for Instance {
    fn from(s: &str) -> Self {
        Instance::String(s.to_string())
    }
}

impl From<String> for Instance {
    fn from(s: String) -> Self {
        Instance::String(s)
    }
}

impl From<bool> for Instance {
    fn from(b: bool) -> Self {
        Instance::Bool(b)
    }
}

impl From<i64> for Instance {
    fn from(n: i64) -> Self {
        Instance::Number(n.into())
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for Instance {
    fn from(ts: DateTime<Tz>) -> Self {
        Instance::Timestamp(ts.fixed_offset())
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Instance::Null => serializer.serialize_unit(),
            Instance::Bool(b) => serializer.serialize_bool(*b),
            Instance::Number(n) => n.serialize(serializer),
            Instance::String(s) => serializer.serialize_str(s),
            Instance::Timestamp(ts) => serializer.serialize_str(&render_timestamp(ts)),
            Instance::Array(items) => items.serialize(serializer),
            Instance::Object(map) => map.serialize(serializer),
        }
    }
}

/// Compact rendering used inside validation messages.
impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
