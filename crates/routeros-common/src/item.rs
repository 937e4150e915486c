//! Device-native item representation.
//!
//! RouterOS reports every object as a flat attribute map with string values
//! (`{".id": "*6", "name": "www-ssl", "port": "443"}`), on both the REST and
//! the legacy API transport.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Attribute carrying the device-internal identifier.
pub const ID_KEY: &str = ".id";

/// One object instance as the device reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceItem(BTreeMap<String, String>);

impl DeviceItem {
    /// Creates an empty item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the value of an attribute, if present.
    pub fn get(&self, attr: &str) -> Option<&str> {
        self.0.get(attr).map(String::as_str)
    }

    /// Checks if an attribute exists.
    pub fn contains(&self, attr: &str) -> bool {
        self.0.contains_key(attr)
    }

    /// Sets an attribute, returning the previous value.
    pub fn set(&mut self, attr: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(attr.into(), value.into())
    }

    /// Removes an attribute.
    pub fn remove(&mut self, attr: &str) -> Option<String> {
        self.0.remove(attr)
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, attr: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(attr, value);
        self
    }

    /// Returns the device identifier (`.id`), if present.
    pub fn id(&self) -> Option<&str> {
        self.get(ID_KEY)
    }

    /// Iterates attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the item has no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges every attribute of `other` into this item.
    pub fn merge(&mut self, other: &DeviceItem) {
        for (k, v) in other.iter() {
            self.set(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DeviceItem {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for DeviceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}

/// Builds a DeviceItem from attribute-value pairs.
#[macro_export]
macro_rules! device_item {
    ($($attr:expr => $value:expr),* $(,)?) => {
        $crate::item::DeviceItem::from_iter([
            $(($attr.to_string(), $value.to_string()),)*
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_item_accessors() {
        let item: DeviceItem = [("port", "22"), ("name", "ssh"), (".id", "*2")]
            .into_iter()
            .collect();

        assert_eq!(item.get("port"), Some("22"));
        assert_eq!(item.get("address"), None);
        assert_eq!(item.id(), Some("*2"));
        assert!(item.contains("name"));
        assert_eq!(item.len(), 3);
    }

    #[test]
    fn test_device_item_macro() {
        let item = device_item! {
            ".id" => "*6",
            "port" => 443,
        };

        assert_eq!(item.id(), Some("*6"));
        assert_eq!(item.get("port"), Some("443"));
    }

    #[test]
    fn test_merge_overwrites() {
        let mut item = device_item! { "name" => "www", "port" => "80" };
        item.merge(&device_item! { "port" => "8080", "vrf" => "main" });

        assert_eq!(item.get("port"), Some("8080"));
        assert_eq!(item.get("vrf"), Some("main"));
        assert_eq!(item.get("name"), Some("www"));
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{".id":"*0","address":"","name":"telnet","port":"23"}"#;
        let item: DeviceItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id(), Some("*0"));
        assert_eq!(item.get("address"), Some(""));
        assert_eq!(serde_json::to_string(&item).unwrap(), json);
    }

    #[test]
    fn test_display() {
        let item = device_item! { "name" => "ssh", "port" => "22" };
        assert_eq!(item.to_string(), "name=ssh port=22");
    }
}
