use std::time::Duration;

use tokio::sync::mpsc;

/// How long a transient notification stays on screen before
/// auto-dismissing.
pub const TRANSIENT_DISMISS_AFTER: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Auto-dismissing; generic connectivity or service failures.
    Transient,
    /// Persistent until dismissed; access-control failures, paired with a
    /// manual retry-load action.
    Permission,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Transient,
            message: message.into(),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Permission,
            message: message.into(),
        }
    }

    pub fn auto_dismiss_after(&self) -> Option<Duration> {
        match self.kind {
            NotificationKind::Transient => Some(TRANSIENT_DISMISS_AFTER),
            NotificationKind::Permission => None,
        }
    }
}

/// Sending half of the notification channel. The presentation layer owns
/// the receiver; a closed receiver silently drops notifications.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn notify(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}
