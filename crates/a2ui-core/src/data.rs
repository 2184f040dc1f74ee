//! Per-surface data model.
//!
//! Containers are reference counted so that an edit can copy the path it
//! touches and share every other subtree with the previous snapshot. Two
//! snapshots can be compared for shared storage with [`DataValue::ptr_eq`]
//! and [`DataModel::ptr_eq`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON object whose values are [`DataValue`]s.
pub type DataObject = BTreeMap<String, DataValue>;

/// A JSON-like value with shared containers.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DataValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Arc<Vec<DataValue>>),
    Object(Arc<DataObject>),
}

impl DataValue {
    pub fn empty_object() -> Self {
        Self::Object(Arc::new(DataObject::new()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for objects only. Arrays and null are not plain objects.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DataValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&DataObject> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Loose truthiness used by boolean bindings: null, false, zero, NaN and
    /// the empty string are false; everything else, including empty
    /// containers, is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) => true,
        }
    }

    /// Whether both values are containers backed by the same allocation.
    pub fn ptr_eq(&self, other: &DataValue) -> bool {
        match (self, other) {
            (Self::Array(a), Self::Array(b)) => Arc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn to_json(&self) -> Value {
        Value::from(self)
    }
}

impl From<Value> for DataValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(Arc::new(items.into_iter().map(Self::from).collect())),
            Value::Object(map) => Self::Object(Arc::new(
                map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            )),
        }
    }
}

impl From<&DataValue> for Value {
    fn from(value: &DataValue) -> Self {
        match value {
            DataValue::Null => Value::Null,
            DataValue::Bool(b) => Value::Bool(*b),
            DataValue::Number(n) => Value::Number(n.clone()),
            DataValue::String(s) => Value::String(s.clone()),
            DataValue::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            DataValue::Object(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect(),
            ),
        }
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for DataValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// Non-finite floats have no JSON form and become null.
impl From<f64> for DataValue {
    fn from(f: f64) -> Self {
        serde_json::Number::from_f64(f).map_or(Self::Null, Self::Number)
    }
}

impl From<Vec<DataValue>> for DataValue {
    fn from(items: Vec<DataValue>) -> Self {
        Self::Array(Arc::new(items))
    }
}

impl From<DataObject> for DataValue {
    fn from(map: DataObject) -> Self {
        Self::Object(Arc::new(map))
    }
}

impl Serialize for DataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for DataValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// The top-level document of a surface. Always an object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataModel {
    root: Arc<DataObject>,
}

impl DataModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &DataObject {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn get_key(&self, key: &str) -> Option<&DataValue> {
        self.root.get(key)
    }

    /// Whether both models share the same top-level allocation.
    pub fn ptr_eq(&self, other: &DataModel) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    pub(crate) fn root_mut(&mut self) -> &mut DataObject {
        Arc::make_mut(&mut self.root)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.root
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v)))
                .collect(),
        )
    }
}

impl From<DataObject> for DataModel {
    fn from(root: DataObject) -> Self {
        Self { root: Arc::new(root) }
    }
}

impl From<Arc<DataObject>> for DataModel {
    fn from(root: Arc<DataObject>) -> Self {
        Self { root }
    }
}

impl Serialize for DataModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DataModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        DataObject::deserialize(deserializer).map(Self::from)
    }
}
