//! Remote task service client and the offline task mirror.

pub mod client;
pub mod error;
pub mod mirror;
pub mod types;

pub use client::TaskServiceClient;
pub use error::{MirrorError, RemoteServiceError};
pub use mirror::{MirrorStore, TaskMirror, TASKS_KEY};
pub use types::{
    CreateTaskRequest, Due, Label, Project, Task, UpdateTaskRequest, MAX_PRIORITY, MIN_PRIORITY,
};
