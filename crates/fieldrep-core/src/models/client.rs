//! Client model (reference data)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::impl_record;
use super::{RecordId, Table};

/// A customer site visited by representatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: RecordId,
    pub name: String,
    pub address: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl_record!(Client, Table::Clients);

impl Client {
    /// Case-insensitive match against the client name or contact person.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term)
            || self
                .contact_person
                .as_deref()
                .is_some_and(|contact| contact.to_lowercase().contains(&term))
    }
}
