//! Record identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Immutable identifier of a business record.
///
/// Locally created records get a UUID v7. Records pulled from the remote
/// authority keep whatever string id the authority assigned, so the wrapper
/// does not require UUID syntax and nothing in the engine depends on id order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a new unique record ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_unique() {
        let id1 = RecordId::new();
        let id2 = RecordId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_record_id_serializes_as_plain_string() {
        let id = RecordId::from("client-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"client-42\"");
    }
}
