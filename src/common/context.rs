use crate::common::error::ServiceResult;
use crate::models::notifications::Notification;
use crate::repositories::collections::CollectionClient;

pub trait Context: Sync + Send {
    fn collections(&self) -> &dyn CollectionClient;
    fn notifier(&self) -> &dyn Notifier;
}

/// Sink for transient toasts.
pub trait Notifier: Sync + Send {
    fn notify(&self, notification: &Notification) -> ServiceResult<()>;
}
