//! Read-only views derived from the task and project lists.
//!
//! Nothing here is stored; every view is recomputed from a snapshot. The
//! current date is passed in so callers (and tests) control "today".

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use doable_services::{Project, Task};

/// Which tasks a list shows by completion state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl CompletionFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            CompletionFilter::All => true,
            CompletionFilter::Pending => !task.completed,
            CompletionFilter::Completed => task.completed,
        }
    }
}

/// Ordering by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::NewestFirst => SortOrder::OldestFirst,
            SortOrder::OldestFirst => SortOrder::NewestFirst,
        }
    }
}

/// Tasks whose due date falls on `today`, newest first.
pub fn due_today(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    today_view(tasks, today, CompletionFilter::All, SortOrder::NewestFirst)
}

/// Tasks due on `today` that pass `filter`, sorted by creation time.
pub fn today_view(
    tasks: &[Task],
    today: NaiveDate,
    filter: CompletionFilter,
    order: SortOrder,
) -> Vec<Task> {
    let mut due: Vec<Task> = tasks
        .iter()
        .filter(|t| t.due_date() == Some(today) && filter.matches(t))
        .cloned()
        .collect();
    match order {
        SortOrder::NewestFirst => due.sort_by(newest_first),
        SortOrder::OldestFirst => due.sort_by(|a, b| newest_first(b, a)),
    }
    due
}

/// Short label for a due date: "Today", "Tomorrow", the weekday name inside
/// the current Sunday-based week, otherwise `dd/mm/yyyy`.
pub fn due_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Today".to_string();
    }
    if today.checked_add_days(Days::new(1)) == Some(date) {
        return "Tomorrow".to_string();
    }

    let since_sunday = u64::from(today.weekday().num_days_from_sunday());
    let week_start = today.checked_sub_days(Days::new(since_sunday));
    let week_end = week_start.and_then(|start| start.checked_add_days(Days::new(6)));
    if let (Some(start), Some(end)) = (week_start, week_end) {
        if (start..=end).contains(&date) {
            return date.format("%A").to_string();
        }
    }

    date.format("%d/%m/%Y").to_string()
}

/// Tasks with a due date other than `today`.
pub fn upcoming(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| matches!(t.due_date(), Some(date) if date != today))
        .cloned()
        .collect()
}

/// Tasks belonging to `project_id`.
pub fn tasks_for_project(tasks: &[Task], project_id: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.project_id == project_id)
        .cloned()
        .collect()
}

/// Tasks whose project is not in `projects`, e.g. after the project was deleted.
pub fn orphaned(tasks: &[Task], projects: &[Project]) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| !projects.iter().any(|p| p.id == t.project_id))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.projects.is_empty()
    }
}

/// Case-insensitive substring search over task content and project names.
pub fn search(query: &str, tasks: &[Task], projects: &[Project]) -> SearchResults {
    let needle = query.to_lowercase();
    let matches = |text: &str| text.to_lowercase().contains(&needle);

    SearchResults {
        tasks: tasks.iter().filter(|t| matches(&t.content)).cloned().collect(),
        projects: projects.iter().filter(|p| matches(&p.name)).cloned().collect(),
    }
}

fn created_at(task: &Task) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(&task.created_at) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(&task.created_at, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Descending creation time. Tasks without a readable timestamp sort first.
fn newest_first(a: &Task, b: &Task) -> Ordering {
    match (created_at(a), created_at(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
