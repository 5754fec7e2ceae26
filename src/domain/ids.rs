//! Domain identifier types with proper encapsulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision variable identifier - newtype for type safety.
///
/// Plain variables use their declared name; members of a variable family
/// use `name[row_key]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(String);

impl VariableId {
    /// Create a new VariableId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier of the member of family `name` for row `key`.
    pub fn indexed(name: &str, key: &RowKey) -> Self {
        Self(format!("{name}[{key}]"))
    }

    /// Get the variable ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VariableId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for VariableId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Key of a data row, as returned by a data source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
    /// Create a new RowKey from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the row key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_variable_id_uses_brackets() {
        let id = VariableId::indexed("estoque", &RowKey::new("A1"));
        assert_eq!(id.as_str(), "estoque[A1]");
    }

    #[test]
    fn variable_ids_order_lexicographically() {
        let mut ids = vec![VariableId::new("y"), VariableId::new("x")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "x");
    }

    #[test]
    fn variable_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&VariableId::new("x")).unwrap();
        assert_eq!(json, "\"x\"");
    }
}
