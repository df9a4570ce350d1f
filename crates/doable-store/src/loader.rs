//! Shared "work in flight" indicator.
//!
//! Each asynchronous operation holds a [`LoaderGuard`] for its duration.
//! Loading is visible while at least one guard is alive, so overlapping
//! operations never hide the spinner early.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

#[derive(Debug)]
struct LoaderInner {
    in_flight: Mutex<usize>,
    visible: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct Loader {
    inner: Arc<LoaderInner>,
}

impl Loader {
    pub fn new() -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            inner: Arc::new(LoaderInner {
                in_flight: Mutex::new(0),
                visible,
            }),
        }
    }

    /// Mark one operation as started. Dropping the guard marks it finished.
    pub fn raise(&self) -> LoaderGuard {
        let mut in_flight = self.inner.in_flight.lock();
        *in_flight += 1;
        self.publish(*in_flight > 0);
        LoaderGuard {
            loader: self.clone(),
        }
    }

    fn lower(&self) {
        let mut in_flight = self.inner.in_flight.lock();
        *in_flight = in_flight.saturating_sub(1);
        self.publish(*in_flight > 0);
    }

    fn publish(&self, loading: bool) {
        self.inner.visible.send_if_modified(|current| {
            let changed = *current != loading;
            *current = loading;
            changed
        });
    }

    pub fn is_loading(&self) -> bool {
        *self.inner.visible.borrow()
    }

    /// Number of operations currently in flight.
    pub fn in_flight(&self) -> usize {
        *self.inner.in_flight.lock()
    }

    /// Observe visibility changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.visible.subscribe()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the loader raised until dropped.
#[derive(Debug)]
#[must_use = "the loader is lowered as soon as the guard is dropped"]
pub struct LoaderGuard {
    loader: Loader,
}

impl Drop for LoaderGuard {
    fn drop(&mut self) {
        self.loader.lower();
    }
}
