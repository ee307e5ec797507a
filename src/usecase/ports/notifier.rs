use crate::domain::entities::notification::Notification;

/// Fire-and-forget sink for action toasts. Implementations must not fail
/// the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
