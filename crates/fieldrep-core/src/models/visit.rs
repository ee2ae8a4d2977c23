//! Visit model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::impl_record;
use super::{RecordId, SyncStatus, Table};

/// How a visit went, as logged by the representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitOutcome {
    Good,
    Missed,
    Problem,
    Bad,
}

/// A check-in at a client site, created offline by the representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: RecordId,
    pub rep_id: RecordId,
    pub client_id: RecordId,
    pub check_in_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_type: Option<VisitOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
}

impl_record!(Visit, Table::Visits, local);

impl Visit {
    /// Start a new pending visit checked in now
    #[must_use]
    pub fn check_in(rep_id: RecordId, client_id: RecordId) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            rep_id,
            client_id,
            check_in_time: now,
            check_out_time: None,
            visit_type: None,
            notes: None,
            sync_status: SyncStatus::Pending,
            created_at: now,
        }
    }

    /// Close the visit with an outcome; the edit must sync again
    #[must_use]
    pub fn check_out(mut self, outcome: VisitOutcome, notes: Option<String>) -> Self {
        self.check_out_time = Some(Utc::now());
        self.visit_type = Some(outcome);
        self.notes = notes;
        self.sync_status = SyncStatus::Pending;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocalRecord;

    #[test]
    fn test_check_in_is_pending() {
        let visit = Visit::check_in(RecordId::from("rep-1"), RecordId::from("client-1"));
        assert_eq!(visit.sync_status(), SyncStatus::Pending);
        assert_eq!(visit.check_in_time, visit.created_at);
        assert!(visit.check_out_time.is_none());
    }

    #[test]
    fn test_check_out_sets_outcome() {
        let visit = Visit::check_in(RecordId::from("rep-1"), RecordId::from("client-1"))
            .check_out(VisitOutcome::Problem, Some("Shelf empty".to_string()));
        assert_eq!(visit.visit_type, Some(VisitOutcome::Problem));
        assert!(visit.check_out_time.is_some());

        let json = serde_json::to_value(&visit).unwrap();
        assert_eq!(json["visit_type"], "problem");
        assert_eq!(json["sync_status"], "pending");
    }

    #[test]
    fn test_check_out_of_failed_visit_is_pending_again() {
        let mut visit = Visit::check_in(RecordId::from("rep-1"), RecordId::from("client-1"));
        visit.set_sync_status(SyncStatus::Failed);

        let visit = visit.check_out(VisitOutcome::Good, None);
        assert_eq!(visit.sync_status(), SyncStatus::Pending);
    }
}
