//! Typed task payloads accepted by the store, validated before dispatch.

use chrono::NaiveDate;
use doable_core::ValidationError;
use doable_services::{CreateTaskRequest, UpdateTaskRequest, MAX_PRIORITY, MIN_PRIORITY};

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn check_priority(priority: Option<u8>) -> Result<(), ValidationError> {
    match priority {
        Some(p) if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&p) => {
            Err(ValidationError::PriorityOutOfRange(p))
        }
        _ => Ok(()),
    }
}

fn require_content(content: &str) -> Result<String, ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("content"));
    }
    Ok(trimmed.to_string())
}

/// A task to be created.
///
/// Without a project the task goes to the inbox project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub content: String,
    pub project_id: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<u8>,
    pub labels: Vec<String>,
}

impl NewTask {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn in_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn due_on(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Validate and build the wire request. `fallback_project` is used when
    /// no project was chosen.
    pub fn into_request(
        self,
        fallback_project: Option<&str>,
    ) -> Result<CreateTaskRequest, ValidationError> {
        let content = require_content(&self.content)?;
        check_priority(self.priority)?;

        let project_id = self
            .project_id
            .filter(|id| !id.trim().is_empty())
            .or_else(|| fallback_project.map(str::to_string))
            .ok_or(ValidationError::NoDefaultProject)?;

        Ok(CreateTaskRequest {
            content,
            project_id,
            description: self.description.filter(|d| !d.trim().is_empty()),
            due_date: self.due_date.map(format_date),
            priority: Some(self.priority.unwrap_or(MIN_PRIORITY)),
            labels: self.labels,
        })
    }
}

/// Edit of an existing task. Content, due date and project are required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub content: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub project_id: Option<String>,
    pub description: Option<String>,
    pub priority: Option<u8>,
    pub labels: Option<Vec<String>>,
}

impl TaskUpdate {
    pub fn new(content: impl Into<String>, due_date: NaiveDate, project_id: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            due_date: Some(due_date),
            project_id: Some(project_id.into()),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validate and build the wire request.
    ///
    /// The project is checked but not sent: the update endpoint cannot move
    /// a task to another project.
    pub fn into_request(self) -> Result<UpdateTaskRequest, ValidationError> {
        let content = require_content(self.content.as_deref().unwrap_or_default())?;
        let due_date = self.due_date.ok_or(ValidationError::MissingField("due_date"))?;
        if self.project_id.as_deref().map_or(true, |p| p.trim().is_empty()) {
            return Err(ValidationError::MissingField("project_id"));
        }
        check_priority(self.priority)?;

        Ok(UpdateTaskRequest {
            content: Some(content),
            description: self.description,
            due_date: Some(format_date(due_date)),
            priority: self.priority,
            labels: self.labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_new_task_defaults() {
        let req = NewTask::new("  Water plants ")
            .in_project("p1")
            .into_request(None)
            .unwrap();

        assert_eq!(req.content, "Water plants");
        assert_eq!(req.project_id, "p1");
        assert_eq!(req.priority, Some(1));
        assert_eq!(req.due_date, None);
    }

    #[test]
    fn test_new_task_falls_back_to_inbox() {
        let req = NewTask::new("Call bank")
            .due_on(jan(5))
            .into_request(Some("inbox-id"))
            .unwrap();

        assert_eq!(req.project_id, "inbox-id");
        assert_eq!(req.due_date.as_deref(), Some("2024-01-05"));
    }

    #[test]
    fn test_new_task_without_any_project() {
        let err = NewTask::new("Orphan").into_request(None).unwrap_err();
        assert_eq!(err, ValidationError::NoDefaultProject);
    }

    #[test]
    fn test_new_task_requires_content() {
        let err = NewTask::new("   ").in_project("p1").into_request(None).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("content"));
    }

    #[test]
    fn test_priority_bounds() {
        let err = NewTask::new("x")
            .in_project("p1")
            .with_priority(5)
            .into_request(None)
            .unwrap_err();
        assert_eq!(err, ValidationError::PriorityOutOfRange(5));

        let err = NewTask::new("x")
            .in_project("p1")
            .with_priority(0)
            .into_request(None)
            .unwrap_err();
        assert_eq!(err, ValidationError::PriorityOutOfRange(0));

        let ok = NewTask::new("x").in_project("p1").with_priority(4).into_request(None);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_update_requires_content_due_and_project() {
        let full = TaskUpdate::new("Edit", jan(2), "p1");

        let missing_content = TaskUpdate {
            content: None,
            ..full.clone()
        };
        assert_eq!(
            missing_content.into_request().unwrap_err(),
            ValidationError::MissingField("content")
        );

        let missing_due = TaskUpdate {
            due_date: None,
            ..full.clone()
        };
        assert_eq!(
            missing_due.into_request().unwrap_err(),
            ValidationError::MissingField("due_date")
        );

        let missing_project = TaskUpdate {
            project_id: Some(" ".to_string()),
            ..full.clone()
        };
        assert_eq!(
            missing_project.into_request().unwrap_err(),
            ValidationError::MissingField("project_id")
        );

        let req = full.with_priority(3).into_request().unwrap();
        assert_eq!(req.content.as_deref(), Some("Edit"));
        assert_eq!(req.due_date.as_deref(), Some("2024-01-02"));
        assert_eq!(req.priority, Some(3));
    }
}
