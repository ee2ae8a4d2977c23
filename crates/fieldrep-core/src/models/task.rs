//! Representative task models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::record::impl_record;
use super::{RecordId, SyncStatus, Table};

/// Progress of a [`RepTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// A task assigned to a representative (merchandising check, photo, survey).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepTask {
    pub id: RecordId,
    pub rep_id: RecordId,
    pub task_type_id: RecordId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
}

impl_record!(RepTask, Table::RepTasks, local);

impl RepTask {
    /// Whether the task still needs work
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status != TaskStatus::Completed
    }

    /// Merge a partial update into this task.
    ///
    /// Completing a task stamps `completed_at` unless the update carries one.
    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(status) = update.status {
            self.status = status;
            if status == TaskStatus::Completed && self.completed_at.is_none() {
                self.completed_at = Some(update.completed_at.unwrap_or_else(Utc::now));
            }
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = Some(completed_at);
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        if let Some(photo_url) = update.photo_url {
            self.photo_url = Some(photo_url);
        }
    }
}

/// Partial update of a [`RepTask`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

/// Kind of task (reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    pub id: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl_record!(TaskType, Table::TaskTypes);
