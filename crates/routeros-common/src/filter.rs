//! Read filters.
//!
//! A filter is an ordered list of `attribute = value` constraints. Order is
//! kept so that the rendered query is stable in logs and request captures.

use std::fmt;

use crate::item::DeviceItem;

/// Attribute constraints narrowing a read query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<(String, String)>,
}

impl Filter {
    /// Creates an empty filter (matches every item).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a clause.
    pub fn insert(&mut self, attr: impl Into<String>, value: impl Into<String>) {
        let attr = attr.into();
        let value = value.into();
        match self.clauses.iter_mut().find(|(a, _)| *a == attr) {
            Some(clause) => clause.1 = value,
            None => self.clauses.push((attr, value)),
        }
    }

    /// Builder-style clause setter.
    pub fn with(mut self, attr: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(attr, value);
        self
    }

    /// Removes a clause, returning its value.
    pub fn remove(&mut self, attr: &str) -> Option<String> {
        let idx = self.clauses.iter().position(|(a, _)| a == attr)?;
        Some(self.clauses.remove(idx).1)
    }

    /// Gets the expected value for an attribute.
    pub fn get(&self, attr: &str) -> Option<&str> {
        self.clauses
            .iter()
            .find(|(a, _)| a == attr)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if a clause exists for the attribute.
    pub fn contains(&self, attr: &str) -> bool {
        self.get(attr).is_some()
    }

    /// Iterates clauses in insertion order.
    pub fn clauses(&self) -> &[(String, String)] {
        &self.clauses
    }

    /// Returns true if there are no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns true if every clause is satisfied by the item.
    pub fn matches(&self, item: &DeviceItem) -> bool {
        self.clauses
            .iter()
            .all(|(attr, value)| item.get(attr) == Some(value.as_str()))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("<all>");
        }
        let rendered: Vec<String> = self
            .clauses
            .iter()
            .map(|(a, v)| format!("{}={}", a, v))
            .collect();
        f.write_str(&rendered.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_item;

    #[test]
    fn test_insert_replaces_existing() {
        let mut filter = Filter::new().with("name", "ssh");
        filter.insert("name", "www");
        filter.insert("dynamic", "false");

        assert_eq!(filter.clauses().len(), 2);
        assert_eq!(filter.get("name"), Some("www"));
        assert_eq!(filter.to_string(), "name=www dynamic=false");
    }

    #[test]
    fn test_remove() {
        let mut filter = Filter::new().with("name", "ssh").with("dynamic", "false");
        assert_eq!(filter.remove("dynamic"), Some("false".to_string()));
        assert!(!filter.contains("dynamic"));
        assert_eq!(filter.remove("dynamic"), None);
    }

    #[test]
    fn test_matches() {
        let item = device_item! { "name" => "ssh", "dynamic" => "false" };

        assert!(Filter::new().matches(&item));
        assert!(Filter::new().with("name", "ssh").matches(&item));
        assert!(!Filter::new().with("name", "www").matches(&item));
        assert!(!Filter::new().with("vrf", "main").matches(&item));
    }

    #[test]
    fn test_empty_display() {
        assert_eq!(Filter::new().to_string(), "<all>");
    }
}
