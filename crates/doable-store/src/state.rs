//! Store snapshot and the pure reducer that evolves it.

use std::collections::BTreeSet;

use doable_services::{Project, Task};

/// Whether the local copy of a task matches what the service last returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Last seen in a service response.
    Confirmed,
    /// Changed locally without the service echoing the new state.
    Pending,
}

/// Immutable snapshot of everything the store owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    /// Ids of tasks with unconfirmed local changes.
    pub pending: BTreeSet<String>,
}

impl StoreState {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// `None` when the task is not in the list.
    pub fn sync_status(&self, id: &str) -> Option<SyncStatus> {
        self.task(id)?;
        if self.pending.contains(id) {
            Some(SyncStatus::Pending)
        } else {
            Some(SyncStatus::Confirmed)
        }
    }
}

/// Outcome of a resolved store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ProjectsLoaded(Vec<Project>),
    ProjectCreated(Project),
    ProjectDeleted(String),
    /// Replace the whole task list (mirror, remote list or refresh).
    TasksLoaded(Vec<Task>),
    TaskCreated(Task),
    TaskUpdated(Task),
    TaskCompleted(String),
    TaskDeleted(String),
    /// Drop every task and project held locally.
    Reset,
}

/// Apply `action` to `state`, producing the next snapshot.
pub fn reduce(state: &StoreState, action: Action) -> StoreState {
    let mut next = state.clone();

    match action {
        Action::ProjectsLoaded(projects) => {
            next.projects = projects;
        }
        Action::ProjectCreated(project) => {
            next.projects.push(project);
        }
        Action::ProjectDeleted(id) => {
            // Tasks in the project are left alone.
            next.projects.retain(|p| p.id != id);
        }
        Action::TasksLoaded(tasks) => {
            next.tasks = tasks;
            next.pending.clear();
        }
        Action::TaskCreated(task) => {
            next.pending.remove(&task.id);
            next.tasks.push(task);
        }
        Action::TaskUpdated(task) => {
            if let Some(slot) = next.tasks.iter_mut().find(|t| t.id == task.id) {
                next.pending.remove(&task.id);
                *slot = task;
            }
        }
        Action::TaskCompleted(id) => {
            if let Some(task) = next.tasks.iter_mut().find(|t| t.id == id) {
                task.completed = !task.completed;
                next.pending.insert(id);
            }
        }
        Action::TaskDeleted(id) => {
            if let Some(index) = next.tasks.iter().position(|t| t.id == id) {
                next.tasks.remove(index);
            }
            next.pending.remove(&id);
        }
        Action::Reset => {
            next = StoreState::default();
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            content: format!("Task {}", id),
            description: None,
            project_id: "p1".to_string(),
            due: None,
            priority: 1,
            completed: false,
            created_at: String::new(),
            labels: Vec::new(),
        }
    }

    fn project(id: &str, name: &str) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn state_with(ids: &[&str]) -> StoreState {
        StoreState {
            tasks: ids.iter().map(|id| task(id)).collect(),
            ..StoreState::default()
        }
    }

    #[test]
    fn test_complete_flips_only_matching_task() {
        let state = state_with(&["1", "2", "3"]);
        let next = reduce(&state, Action::TaskCompleted("2".into()));

        assert!(next.task("2").unwrap().completed);
        assert_eq!(next.task("1"), state.task("1"));
        assert_eq!(next.task("3"), state.task("3"));
        assert_eq!(next.sync_status("2"), Some(SyncStatus::Pending));
        assert_eq!(next.sync_status("1"), Some(SyncStatus::Confirmed));

        // Input snapshot is untouched.
        assert!(!state.task("2").unwrap().completed);
    }

    #[test]
    fn test_complete_twice_toggles_back() {
        let state = state_with(&["1"]);
        let once = reduce(&state, Action::TaskCompleted("1".into()));
        let twice = reduce(&once, Action::TaskCompleted("1".into()));
        assert!(!twice.task("1").unwrap().completed);
    }

    #[test]
    fn test_complete_unknown_id_is_noop() {
        let state = state_with(&["1"]);
        let next = reduce(&state, Action::TaskCompleted("nope".into()));
        assert_eq!(next, state);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let state = state_with(&["1", "2", "3"]);
        let next = reduce(&state, Action::TaskDeleted("2".into()));

        let ids: Vec<_> = next.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let unchanged = reduce(&next, Action::TaskDeleted("2".into()));
        assert_eq!(unchanged, next);
    }

    #[test]
    fn test_update_replaces_by_id_and_confirms() {
        let state = reduce(&state_with(&["1", "2"]), Action::TaskCompleted("1".into()));

        let mut edited = task("1");
        edited.content = "Edited".to_string();
        let next = reduce(&state, Action::TaskUpdated(edited));

        assert_eq!(next.task("1").unwrap().content, "Edited");
        assert_eq!(next.tasks.len(), 2);
        assert_eq!(next.sync_status("1"), Some(SyncStatus::Confirmed));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let state = state_with(&["1"]);
        let next = reduce(&state, Action::TaskUpdated(task("9")));
        assert_eq!(next, state);
    }

    #[test]
    fn test_tasks_loaded_replaces_and_clears_pending() {
        let state = reduce(&state_with(&["1"]), Action::TaskCompleted("1".into()));
        let next = reduce(&state, Action::TasksLoaded(vec![task("1"), task("5")]));

        assert_eq!(next.tasks.len(), 2);
        assert!(next.pending.is_empty());
    }

    #[test]
    fn test_project_delete_keeps_tasks() {
        let state = StoreState {
            tasks: vec![task("1")],
            projects: vec![project("p1", "Home"), project("p2", "Work")],
            ..StoreState::default()
        };
        let next = reduce(&state, Action::ProjectDeleted("p1".into()));

        assert_eq!(next.projects, vec![project("p2", "Work")]);
        assert_eq!(next.tasks, state.tasks);
    }

    #[test]
    fn test_reset_empties_everything() {
        let state = StoreState {
            projects: vec![project("p1", "Home")],
            ..reduce(&state_with(&["1", "2"]), Action::TaskCompleted("1".into()))
        };
        let next = reduce(&state, Action::Reset);
        assert_eq!(next, StoreState::default());
    }

    #[test]
    fn test_project_created_appends() {
        let state = StoreState::default();
        let next = reduce(&state, Action::ProjectCreated(project("p1", "Home")));
        assert_eq!(next.projects.len(), 1);
        assert_eq!(next.project("p1").unwrap().name, "Home");
    }
}
