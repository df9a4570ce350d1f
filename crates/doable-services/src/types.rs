//! Task, project and label types, plus the wire schema of the task service.
//!
//! `Api*` types mirror what the REST API returns. Everything the rest of the
//! workspace touches is the local model (`Task`, `Project`, `Label`), which is
//! also what the offline mirror serializes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lowest (and default) task priority.
pub const MIN_PRIORITY: u8 = 1;
/// Highest task priority.
pub const MAX_PRIORITY: u8 = 4;

/// Due information for a task.
///
/// `datetime` is always present; an empty string means the task is due on a
/// date without a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Due {
    pub date: String,
    #[serde(default)]
    pub datetime: String,
}

impl Due {
    /// Calendar date of the due entry, ignoring any time component.
    pub fn naive_date(&self) -> Option<NaiveDate> {
        let prefix = self.date.get(..10).unwrap_or(&self.date);
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }
}

/// A task as held by the state container and the offline mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub due: Option<Due>,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

fn default_priority() -> u8 {
    MIN_PRIORITY
}

impl Task {
    /// Due date of the task, if it has a parseable one.
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due.as_ref().and_then(Due::naive_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

/// Due object as returned by the task service.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiDue {
    pub date: String,
    #[serde(default)]
    pub datetime: Option<String>,
}

/// Task as returned by the task service.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiTask {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub due: Option<ApiDue>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

impl From<ApiTask> for Task {
    fn from(api: ApiTask) -> Self {
        Self {
            id: api.id,
            content: api.content,
            description: api.description.filter(|d| !d.is_empty()),
            project_id: api.project_id,
            due: api.due.map(|due| Due {
                date: due.date,
                datetime: due.datetime.unwrap_or_default(),
            }),
            priority: api.priority.unwrap_or(MIN_PRIORITY),
            completed: api.is_completed,
            created_at: api.created_at.unwrap_or_default(),
            labels: api.labels.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiProject {
    pub id: String,
    pub name: String,
}

impl From<ApiProject> for Project {
    fn from(api: ApiProject) -> Self {
        Self {
            id: api.id,
            name: api.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiLabel {
    pub id: String,
    pub name: String,
}

impl From<ApiLabel> for Label {
    fn from(api: ApiLabel) -> Self {
        Self {
            id: api.id,
            name: api.name,
        }
    }
}

/// Body of a create-project call.
#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

/// Body of a create-task call.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest {
    pub content: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// Body of an update-task call. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}
