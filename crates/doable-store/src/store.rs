//! The state container: canonical task and project lists plus the actions
//! that change them.
//!
//! Every networked action follows the same envelope: raise the loader, call
//! the service, then on success apply the reducer, persist the mirror and
//! notify. On failure the state is left as it was, an error notification is
//! emitted and the error is returned. The loader guard is dropped on every
//! path.

use std::future::Future;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use doable_core::{ProjectsConfig, ValidationError};
use doable_services::{Label, Project, RemoteServiceError, Task, TaskMirror, TaskServiceClient};
use parking_lot::{Mutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;

use crate::error::StoreError;
use crate::loader::Loader;
use crate::notify::Notifier;
use crate::request::{NewTask, TaskUpdate};
use crate::state::{reduce, Action, StoreState, SyncStatus};
use crate::views::{self, CompletionFilter, SearchResults, SortOrder};

const TRY_AGAIN: &str = "Please try again.";

/// Local project policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Creating a project is refused once this many exist.
    pub max_projects: usize,
    /// Name of the project that receives tasks created without one.
    pub inbox_name: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        ProjectsConfig::default().into()
    }
}

impl From<ProjectsConfig> for StoreSettings {
    fn from(config: ProjectsConfig) -> Self {
        Self {
            max_projects: config.max_projects,
            inbox_name: config.inbox_name,
        }
    }
}

pub struct TaskStore {
    client: TaskServiceClient,
    mirror: TaskMirror,
    settings: StoreSettings,
    state: RwLock<Arc<StoreState>>,
    loader: Loader,
    notifier: Notifier,
    /// Serializes snapshot-then-write so the mirror never goes backwards.
    persist_lock: AsyncMutex<()>,
    /// Project creations that passed the cap check but have not resolved.
    creating_projects: Mutex<usize>,
}

/// Reserved slot under the project cap, released on drop.
struct ProjectSlot<'a> {
    creating: &'a Mutex<usize>,
}

impl Drop for ProjectSlot<'_> {
    fn drop(&mut self) {
        let mut creating = self.creating.lock();
        *creating = creating.saturating_sub(1);
    }
}

impl TaskStore {
    pub fn new(client: TaskServiceClient, mirror: TaskMirror, settings: StoreSettings) -> Self {
        Self {
            client,
            mirror,
            settings,
            state: RwLock::new(Arc::new(StoreState::default())),
            loader: Loader::new(),
            notifier: Notifier::new(),
            persist_lock: AsyncMutex::new(()),
            creating_projects: Mutex::new(0),
        }
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    // ---- selectors ----

    /// Current snapshot. Cheap to clone and never changes after it is taken.
    pub fn snapshot(&self) -> Arc<StoreState> {
        self.state.read().clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.snapshot().tasks.clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.snapshot().projects.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn tasks_for_project(&self, project_id: &str) -> Vec<Task> {
        views::tasks_for_project(&self.snapshot().tasks, project_id)
    }

    pub fn sync_status(&self, task_id: &str) -> Option<SyncStatus> {
        self.snapshot().sync_status(task_id)
    }

    /// Name of the project, `None` if it is unknown (or was deleted).
    pub fn project_name(&self, project_id: &str) -> Option<String> {
        self.snapshot().project(project_id).map(|p| p.name.clone())
    }

    pub fn inbox(&self) -> Option<Project> {
        self.snapshot()
            .projects
            .iter()
            .find(|p| p.name == self.settings.inbox_name)
            .cloned()
    }

    pub fn due_on(&self, date: NaiveDate) -> Vec<Task> {
        views::due_today(&self.snapshot().tasks, date)
    }

    pub fn due_today(&self) -> Vec<Task> {
        self.due_on(Local::now().date_naive())
    }

    pub fn upcoming(&self) -> Vec<Task> {
        views::upcoming(&self.snapshot().tasks, Local::now().date_naive())
    }

    /// Today's tasks narrowed by completion and ordered by creation time.
    pub fn today_view(&self, filter: CompletionFilter, order: SortOrder) -> Vec<Task> {
        views::today_view(
            &self.snapshot().tasks,
            Local::now().date_naive(),
            filter,
            order,
        )
    }

    /// Display label for the task's due date, `None` when it has none.
    pub fn due_label(&self, task: &Task) -> Option<String> {
        task.due_date()
            .map(|date| views::due_label(date, Local::now().date_naive()))
    }

    pub fn search(&self, query: &str) -> SearchResults {
        let snapshot = self.snapshot();
        views::search(query, &snapshot.tasks, &snapshot.projects)
    }

    pub fn orphaned_tasks(&self) -> Vec<Task> {
        let snapshot = self.snapshot();
        views::orphaned(&snapshot.tasks, &snapshot.projects)
    }

    // ---- plumbing ----

    fn dispatch(&self, action: Action) {
        let mut state = self.state.write();
        *state = Arc::new(reduce(&state, action));
    }

    async fn remote<T, Fut>(&self, failure: &str, call: Fut) -> Result<T, StoreError>
    where
        Fut: Future<Output = Result<T, RemoteServiceError>>,
    {
        match call.await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!("{}: {}", failure, e);
                self.notifier.error(failure, TRY_AGAIN);
                Err(e.into())
            }
        }
    }

    fn reject(&self, err: ValidationError) -> StoreError {
        tracing::debug!("Rejected before dispatch: {}", err);
        self.notifier.error(err.user_message(), err.to_string());
        err.into()
    }

    /// Rewrite the mirror from the latest snapshot.
    ///
    /// The snapshot is taken under `persist_lock`, so a later write always
    /// carries a state at least as new as the one before it.
    async fn persist(&self) {
        let _writing = self.persist_lock.lock().await;
        let tasks = self.snapshot().tasks.clone();
        self.mirror.save(tasks).await;
    }

    fn reserve_project_slot(&self) -> Result<ProjectSlot<'_>, ValidationError> {
        let max = self.settings.max_projects;
        let mut creating = self.creating_projects.lock();
        if self.snapshot().projects.len() + *creating >= max {
            return Err(ValidationError::ProjectLimitReached { max });
        }
        *creating += 1;
        Ok(ProjectSlot {
            creating: &self.creating_projects,
        })
    }

    // ---- project actions ----

    pub async fn fetch_projects(&self) -> Result<Vec<Project>, StoreError> {
        let _loading = self.loader.raise();
        let projects = self
            .remote("Could not load projects", self.client.list_projects())
            .await?;

        self.dispatch(Action::ProjectsLoaded(projects.clone()));
        Ok(projects)
    }

    pub async fn create_project(&self, name: &str) -> Result<Project, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.reject(ValidationError::EmptyProjectName));
        }

        // Creations still in flight count against the cap.
        let _slot = self.reserve_project_slot().map_err(|e| self.reject(e))?;

        let _loading = self.loader.raise();
        let project = self
            .remote("Could not create project", self.client.create_project(name))
            .await?;

        self.dispatch(Action::ProjectCreated(project.clone()));
        self.notifier.success("Project created", project.name.clone());
        Ok(project)
    }

    /// Delete a project. Its tasks stay in the list.
    pub async fn delete_project(&self, id: &str) -> Result<(), StoreError> {
        let _loading = self.loader.raise();
        self.remote("Could not delete project", self.client.delete_project(id))
            .await?;

        self.dispatch(Action::ProjectDeleted(id.to_string()));
        Ok(())
    }

    // ---- task actions ----

    /// Load tasks from the mirror, going to the service only when it is empty.
    pub async fn fetch_all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let _loading = self.loader.raise();

        let cached = self.mirror.load().await;
        if !cached.is_empty() {
            tracing::info!("Using {} tasks from the offline mirror", cached.len());
            self.notifier.info(
                "Showing saved tasks",
                "Refresh to get the latest from the service.",
            );
            self.dispatch(Action::TasksLoaded(cached.clone()));
            return Ok(cached);
        }

        let tasks = self
            .remote("Could not load tasks", self.client.list_tasks(None))
            .await?;

        self.dispatch(Action::TasksLoaded(tasks.clone()));
        self.persist().await;
        Ok(tasks)
    }

    /// Replace the task list with the tasks of one project, straight from the
    /// service.
    pub async fn fetch_tasks_by_project(&self, project_id: &str) -> Result<Vec<Task>, StoreError> {
        let _loading = self.loader.raise();
        let tasks = self
            .remote(
                "Could not load project tasks",
                self.client.list_tasks(Some(project_id)),
            )
            .await?;

        self.dispatch(Action::TasksLoaded(tasks.clone()));
        Ok(tasks)
    }

    /// Reload every task from the service, dropping unconfirmed local changes.
    pub async fn refresh_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let _loading = self.loader.raise();
        let tasks = self
            .remote("Could not refresh tasks", self.client.list_tasks(None))
            .await?;

        self.dispatch(Action::TasksLoaded(tasks.clone()));
        self.persist().await;
        Ok(tasks)
    }

    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, StoreError> {
        let inbox = self.inbox();
        let request = new_task
            .into_request(inbox.as_ref().map(|p| p.id.as_str()))
            .map_err(|e| self.reject(e))?;

        let _loading = self.loader.raise();
        let task = self
            .remote("Could not create task", self.client.create_task(&request))
            .await?;

        self.dispatch(Action::TaskCreated(task.clone()));
        self.persist().await;
        self.notifier.success("Task created", task.content.clone());
        Ok(task)
    }

    pub async fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task, StoreError> {
        let request = update.into_request().map_err(|e| self.reject(e))?;

        let _loading = self.loader.raise();
        let task = self
            .remote("Could not update task", self.client.update_task(id, &request))
            .await?;

        self.dispatch(Action::TaskUpdated(task.clone()));
        self.persist().await;
        self.notifier.success("Task updated", task.content.clone());
        Ok(task)
    }

    /// Close the task remotely and flip its local completion flag.
    ///
    /// The response body is not inspected; the task stays `Pending` until the
    /// next refresh.
    pub async fn complete_task(&self, id: &str) -> Result<(), StoreError> {
        let _loading = self.loader.raise();
        self.remote("Could not complete task", self.client.close_task(id))
            .await?;

        self.dispatch(Action::TaskCompleted(id.to_string()));
        self.persist().await;
        self.notifier.success("Task completed", "");
        Ok(())
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let _loading = self.loader.raise();
        self.remote("Could not delete task", self.client.delete_task(id))
            .await?;

        self.dispatch(Action::TaskDeleted(id.to_string()));
        self.persist().await;
        self.notifier.success("Task deleted", "");
        Ok(())
    }

    /// Forget everything held locally: the mirror and both lists.
    ///
    /// The next `fetch_all_tasks` goes back to the service.
    pub async fn reset(&self) {
        let _writing = self.persist_lock.lock().await;
        if let Err(e) = self.mirror.clear().await {
            tracing::warn!("Failed to clear task mirror: {}", e);
        }
        self.dispatch(Action::Reset);
        self.notifier
            .info("Local data cleared", "Tasks will be reloaded from the service.");
    }

    // ---- labels ----

    pub async fn fetch_labels(&self) -> Result<Vec<Label>, StoreError> {
        let _loading = self.loader.raise();
        self.remote("Could not load labels", self.client.list_labels())
            .await
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("TaskStore")
            .field("tasks", &snapshot.tasks.len())
            .field("projects", &snapshot.projects.len())
            .field("in_flight", &self.loader.in_flight())
            .finish()
    }
}
