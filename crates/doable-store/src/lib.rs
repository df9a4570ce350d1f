//! State container for Doable.
//!
//! [`TaskStore`] owns the task and project lists, coordinates the remote
//! client and the offline mirror on every mutation, and publishes loader and
//! notification signals for the presentation layer.

pub mod error;
pub mod loader;
pub mod notify;
pub mod request;
pub mod state;
pub mod store;
pub mod views;

pub use error::StoreError;
pub use loader::{Loader, LoaderGuard};
pub use notify::{Notification, Notifier, Severity};
pub use request::{NewTask, TaskUpdate};
pub use state::{reduce, Action, StoreState, SyncStatus};
pub use store::{StoreSettings, TaskStore};
pub use views::{CompletionFilter, SearchResults, SortOrder};
