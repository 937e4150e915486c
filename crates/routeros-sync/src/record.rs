//! Declared records and typed field values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A typed declared value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag (`disabled`, `dynamic`).
    Bool(bool),
    /// Integer (`port`, `max-sessions`).
    Int(i64),
    /// Plain or enumerated string.
    String(String),
    /// Multi-value attribute, comma-joined on the device.
    List(Vec<String>),
}

impl Value {
    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the list payload, if this is a list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Renders the value the way the device expects it.
    pub fn to_device_string(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::String(s) => s.clone(),
            Value::List(l) => l.join(","),
        }
    }

    /// Short kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::String(_) => "string",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_device_string())
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

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(l: Vec<String>) -> Self {
        Value::List(l)
    }
}

/// The operator's intended configuration for one object instance.
///
/// User-declared values and device-reported computed values are kept apart:
/// computed values are never sent to the device and are replaced on every
/// read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredRecord {
    /// Device identifier, set once the instance is known to exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// User-declared values by field name.
    #[serde(default)]
    values: BTreeMap<String, Value>,

    /// Device-reported computed and read-only values by field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    computed: BTreeMap<String, Value>,
}

impl DeclaredRecord {
    /// Creates an empty record with no identifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style declared value setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets a declared value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(field.into(), value.into())
    }

    /// Gets a value, preferring the declared one over the computed one.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field).or_else(|| self.computed.get(field))
    }

    /// Gets a user-declared value only.
    pub fn declared(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Gets a device-computed value only.
    pub fn computed(&self, field: &str) -> Option<&Value> {
        self.computed.get(field)
    }

    /// Iterates user-declared values in field-name order.
    pub fn declared_values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns true if the record holds a device identifier.
    pub fn is_synced(&self) -> bool {
        self.id.is_some()
    }

    /// Clears the identifier (instance absent or deleted).
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub(crate) fn set_computed(&mut self, field: impl Into<String>, value: Value) {
        self.computed.insert(field.into(), value);
    }

    pub(crate) fn clear_computed(&mut self) {
        self.computed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_device_string() {
        assert_eq!(Value::from(true).to_device_string(), "true");
        assert_eq!(Value::from(443i64).to_device_string(), "443");
        assert_eq!(Value::from("www-ssl").to_device_string(), "www-ssl");
        assert_eq!(
            Value::from(vec!["10.0.0.0/24".to_string(), "10.1.0.0/24".to_string()])
                .to_device_string(),
            "10.0.0.0/24,10.1.0.0/24"
        );
    }

    #[test]
    fn test_value_untagged_json() {
        let v: Value = serde_json::from_str("22").unwrap();
        assert_eq!(v, Value::Int(22));
        let v: Value = serde_json::from_str("\"ssh\"").unwrap();
        assert_eq!(v, Value::String("ssh".into()));
        let v: Value = serde_json::from_str("false").unwrap();
        assert_eq!(v, Value::Bool(false));
    }

    #[test]
    fn test_record_declared_vs_computed() {
        let mut record = DeclaredRecord::new().with("numbers", "ssh").with("port", 22i64);
        record.set_computed("proto", Value::from("tcp"));

        assert_eq!(record.get("port"), Some(&Value::Int(22)));
        assert_eq!(record.get("proto"), Some(&Value::from("tcp")));
        assert_eq!(record.declared("proto"), None);
        assert_eq!(record.computed("proto"), Some(&Value::from("tcp")));
        assert_eq!(record.declared_values().count(), 2);
    }

    #[test]
    fn test_record_id_lifecycle() {
        let mut record = DeclaredRecord::new();
        assert!(!record.is_synced());
        record.id = Some("*2".to_string());
        assert!(record.is_synced());
        record.clear_id();
        assert!(!record.is_synced());
    }
}
