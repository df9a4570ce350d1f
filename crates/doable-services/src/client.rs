//! REST client for the remote task service.
//!
//! One method per verb per entity. Every call is a single request/response
//! exchange; nothing is retried here.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::error::RemoteServiceError;
use crate::types::{
    ApiLabel, ApiProject, ApiTask, CreateProjectRequest, CreateTaskRequest, Label, Project, Task,
    UpdateTaskRequest,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_ID_HEADER: &str = "X-Request-Id";

type Result<T> = std::result::Result<T, RemoteServiceError>;

/// Task service API client
#[derive(Debug, Clone)]
pub struct TaskServiceClient {
    base_url: Url,
    client: Arc<Client>,
    token: String,
}

impl TaskServiceClient {
    /// Create a client for `base_url` authenticating with a bearer `token`
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        // Url::join drops the last path segment unless the base ends with '/'.
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            base_url: Url::parse(&base)?,
            client: Arc::new(client),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn item_endpoint(&self, collection: &str, id: &str, action: Option<&str>) -> Result<Url> {
        let mut path = format!("{}/{}", collection, urlencoding::encode(id));
        if let Some(action) = action {
            path.push('/');
            path.push_str(action);
        }
        self.endpoint(&path)
    }

    /// Attach the bearer token
    fn build_request(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, "application/json")
    }

    /// Attach the bearer token and a fresh idempotency key
    fn build_mutation(&self, req: RequestBuilder) -> RequestBuilder {
        self.build_request(req)
            .header(REQUEST_ID_HEADER, uuid::Uuid::new_v4().to_string())
    }

    /// Check response status and extract error
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!("Task service returned {}: {}", status, message);
            return Err(RemoteServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let response = self.check_response(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to decode task service response: {}", e);
            RemoteServiceError::Decode(e.to_string())
        })
    }

    /// List all projects
    #[instrument(skip(self), level = "debug")]
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let url = self.endpoint("projects")?;
        let response = self.build_request(self.client.get(url)).send().await?;
        let projects: Vec<ApiProject> = self.decode(response).await?;

        tracing::info!("Fetched {} projects", projects.len());
        Ok(projects.into_iter().map(Project::from).collect())
    }

    /// Create a project
    #[instrument(skip(self), level = "debug")]
    pub async fn create_project(&self, name: &str) -> Result<Project> {
        let url = self.endpoint("projects")?;
        let body = CreateProjectRequest {
            name: name.to_string(),
        };
        let response = self
            .build_mutation(self.client.post(url).json(&body))
            .send()
            .await?;
        let project: ApiProject = self.decode(response).await?;

        tracing::info!("Created project {} ({})", project.name, project.id);
        Ok(project.into())
    }

    /// Delete a project
    #[instrument(skip(self), level = "debug")]
    pub async fn delete_project(&self, id: &str) -> Result<()> {
        let url = self.item_endpoint("projects", id, None)?;
        let response = self.build_mutation(self.client.delete(url)).send().await?;
        self.check_response(response).await?;

        tracing::info!("Deleted project {}", id);
        Ok(())
    }

    /// List active tasks, optionally restricted to one project
    #[instrument(skip(self), level = "debug")]
    pub async fn list_tasks(&self, project_id: Option<&str>) -> Result<Vec<Task>> {
        let url = self.endpoint("tasks")?;
        let mut request = self.client.get(url);
        if let Some(project_id) = project_id {
            request = request.query(&[("project_id", project_id)]);
        }

        let response = self.build_request(request).send().await?;
        let tasks: Vec<ApiTask> = self.decode(response).await?;

        tracing::info!("Fetched {} tasks", tasks.len());
        Ok(tasks.into_iter().map(Task::from).collect())
    }

    /// Create a task
    #[instrument(skip(self, request), level = "debug")]
    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task> {
        let url = self.endpoint("tasks")?;
        let response = self
            .build_mutation(self.client.post(url).json(request))
            .send()
            .await?;
        let task: ApiTask = self.decode(response).await?;

        tracing::info!("Created task {}", task.id);
        Ok(task.into())
    }

    /// Update a task, returning the service's view of it
    #[instrument(skip(self, request), level = "debug")]
    pub async fn update_task(&self, id: &str, request: &UpdateTaskRequest) -> Result<Task> {
        let url = self.item_endpoint("tasks", id, None)?;
        let response = self
            .build_mutation(self.client.post(url).json(request))
            .send()
            .await?;
        let task: ApiTask = self.decode(response).await?;

        tracing::info!("Updated task {}", id);
        Ok(task.into())
    }

    /// Close (complete) a task
    #[instrument(skip(self), level = "debug")]
    pub async fn close_task(&self, id: &str) -> Result<()> {
        let url = self.item_endpoint("tasks", id, Some("close"))?;
        let response = self.build_mutation(self.client.post(url)).send().await?;
        self.check_response(response).await?;

        tracing::info!("Closed task {}", id);
        Ok(())
    }

    /// Delete a task
    #[instrument(skip(self), level = "debug")]
    pub async fn delete_task(&self, id: &str) -> Result<()> {
        let url = self.item_endpoint("tasks", id, None)?;
        let response = self.build_mutation(self.client.delete(url)).send().await?;
        self.check_response(response).await?;

        tracing::info!("Deleted task {}", id);
        Ok(())
    }

    /// List the user's labels
    #[instrument(skip(self), level = "debug")]
    pub async fn list_labels(&self) -> Result<Vec<Label>> {
        let url = self.endpoint("labels")?;
        let response = self.build_request(self.client.get(url)).send().await?;
        let labels: Vec<ApiLabel> = self.decode(response).await?;

        tracing::info!("Fetched {} labels", labels.len());
        Ok(labels.into_iter().map(Label::from).collect())
    }
}
