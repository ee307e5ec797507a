use tracing::{error, info, warn};

use crate::domain::entities::notification::{Notification, Variant};
use crate::usecase::ports::notifier::Notifier;

/// Emits each notification as a log event, for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let Notification {
            title,
            message,
            variant,
            ..
        } = notification;
        match variant {
            Variant::Success | Variant::Info => info!(%title, "{message}"),
            Variant::Warning => warn!(%title, "{message}"),
            Variant::Error => error!(%title, "{message}"),
        }
    }
}
