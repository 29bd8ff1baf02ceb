//! Transient notification bus.
//!
//! The UI shell subscribes to this bus for success banners and
//! auto-dismissing error toasts. It is constructed once and handed down
//! through component construction, an explicit collaborator instead of the
//! module-global callback pointer the engine replaces.
//!
//! Thread-safe: uses an internal `Mutex` so it can be shared across async
//! tasks without requiring `&mut self`.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Notification category, driving presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient, auto-dismissing message.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// Instant after which the UI should stop showing the message.
    pub expires_at: DateTime<Utc>,
}

/// Collects notifications for the UI to drain.
#[derive(Debug)]
pub struct NotificationBus {
    dismiss_after_ms: i64,
    queue: Mutex<Vec<Notification>>,
}

impl NotificationBus {
    pub fn new(dismiss_after_ms: u64) -> Self {
        Self {
            dismiss_after_ms: dismiss_after_ms as i64,
            queue: Mutex::new(Vec::new()),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(NotificationKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(NotificationKind::Error, message.into());
    }

    fn publish(&self, kind: NotificationKind, message: String) {
        let notification = Notification {
            kind,
            message,
            expires_at: Utc::now() + Duration::milliseconds(self.dismiss_after_ms),
        };
        let mut queue = self.queue.lock().unwrap();
        queue.push(notification);
    }

    /// Take all queued notifications, leaving the queue empty.
    pub fn drain(&self) -> Vec<Notification> {
        let mut queue = self.queue.lock().unwrap();
        std::mem::take(&mut *queue)
    }

    /// Currently visible notifications (drops expired ones in passing).
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let mut queue = self.queue.lock().unwrap();
        queue.retain(|n| n.expires_at > now);
        queue.clone()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().unwrap().is_empty()
    }
}
