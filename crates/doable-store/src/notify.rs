//! Transient success/error/info notifications for the presentation layer.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub body: String,
}

/// Fire-and-forget notification emitter.
///
/// Emitting with nobody subscribed is fine; slow subscribers may miss
/// old notifications.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn emit(&self, severity: Severity, title: impl Into<String>, body: impl Into<String>) {
        let notification = Notification {
            severity,
            title: title.into(),
            body: body.into(),
        };

        match severity {
            Severity::Error => tracing::warn!("{}: {}", notification.title, notification.body),
            _ => tracing::info!("{}: {}", notification.title, notification.body),
        }

        // No receivers is not an error.
        let _ = self.tx.send(notification);
    }

    pub fn success(&self, title: impl Into<String>, body: impl Into<String>) {
        self.emit(Severity::Success, title, body);
    }

    pub fn error(&self, title: impl Into<String>, body: impl Into<String>) {
        self.emit(Severity::Error, title, body);
    }

    pub fn info(&self, title: impl Into<String>, body: impl Into<String>) {
        self.emit(Severity::Info, title, body);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers() {
        let notifier = Notifier::new();
        notifier.success("Saved", "");
    }

    #[tokio::test]
    async fn test_subscriber_receives_notification() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.error("Could not load projects", "Try again.");

        let received = rx.recv().await.unwrap();
        assert_eq!(received.severity, Severity::Error);
        assert_eq!(received.title, "Could not load projects");
        assert_eq!(received.body, "Try again.");
    }

    #[tokio::test]
    async fn test_queued_notifications_survive_dropping_notifier() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.success("Task created", "one");
        notifier.info("Local data cleared", "");
        drop(notifier);

        assert_eq!(rx.recv().await.unwrap().severity, Severity::Success);
        assert_eq!(rx.recv().await.unwrap().severity, Severity::Info);
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }
}
