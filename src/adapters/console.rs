use crate::common::context::Notifier;
use crate::common::error::ServiceResult;
use crate::models::notifications::{Notification, NotificationKind};
use tracing::{error, info};

/// Writes toasts to the log. Used when no webhook is configured.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) -> ServiceResult<()> {
        match notification.kind {
            NotificationKind::Success => {
                info!(kind = notification.kind.as_str(), "{}", notification.text)
            }
            NotificationKind::Error => {
                error!(kind = notification.kind.as_str(), "{}", notification.text)
            }
        }
        Ok(())
    }
}
