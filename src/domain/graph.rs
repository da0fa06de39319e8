//! Graph primitives: node identifiers, versions and attribute values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node in the temporal graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a raw identifier
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw identifier
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point in the temporal store's history.
///
/// Reads at version `v` observe the latest write made at a version `<= v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// The earliest representable version. Records anchored here are
    /// visible at every version.
    pub const BEGINNING: Version = Version(i64::MIN);

    /// The conventional starting version of a graph
    pub const ZERO: Version = Version(0);

    /// The latest representable version. A read here sees every write.
    pub const LATEST: Version = Version(i64::MAX);

    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Version {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::BEGINNING {
            write!(f, "v<beginning>")
        } else {
            write!(f, "v{}", self.0)
        }
    }
}

/// An attribute value stored on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Text(String),
    Id(NodeId),
    IntList(Vec<usize>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<NodeId> {
        match self {
            Value::Id(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_int_list(&self) -> Option<&[usize]> {
        match self {
            Value::IntList(list) => Some(list),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering() {
        assert!(Version::BEGINNING < Version::ZERO);
        assert!(Version::ZERO < Version::new(1));
        assert_eq!(Version::default(), Version::ZERO);
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from("apple").as_text(), Some("apple"));
        assert_eq!(Value::Id(NodeId::new(3)).as_id(), Some(NodeId::new(3)));
        assert_eq!(Value::IntList(vec![0, 5]).as_int_list(), Some(&[0, 5][..]));
        assert!(Value::Id(NodeId::new(1)).as_text().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeId::new(7).to_string(), "#7");
        assert_eq!(Version::new(2).to_string(), "v2");
        assert_eq!(Version::BEGINNING.to_string(), "v<beginning>");
    }
}
