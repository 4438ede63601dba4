use crate::common::context::Notifier;
use crate::common::error::AppError;
use crate::models::messages::Message;
use crate::models::notifications::Notification;
use crate::models::viewers::Viewer;
use tracing::{debug, warn};

pub const NEW_MESSAGE_TEXT: &str = "💌 You received a new message!";
pub const NEW_GIFT_MESSAGE_TEXT: &str = "🎁 You received a new message with a gift!";

/// Toast for a freshly created message, if the viewer should see one.
/// Broadcast messages never notify anybody individually.
pub fn message_notification(viewer: Option<&Viewer>, message: &Message) -> Option<Notification> {
    let viewer = viewer?;
    if message.is_broadcast() || !message.recipient.is_user(&viewer.student_id) {
        return None;
    }

    let text = match message.has_gifts() {
        true => NEW_GIFT_MESSAGE_TEXT,
        false => NEW_MESSAGE_TEXT,
    };
    Some(Notification::success(text))
}

pub fn deliver(notifier: &dyn Notifier, notification: &Notification) {
    if let Err(e) = notifier.notify(notification) {
        debug!(
            kind = notification.kind.as_str(),
            text = %notification.text,
            "Dropping undeliverable notification: {e}"
        );
    }
}

/// Surfaces an error through the global notifier unless the caller renders it inline.
pub fn catch_and_notify_error(notifier: &dyn Notifier, error: AppError) {
    if error.is_inline() || error.is_silent() {
        debug!(code = error.code(), "Suppressing global notification");
        return;
    }
    warn!(code = error.code(), "Notifying user of error");
    deliver(notifier, &Notification::error(error.message()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ServiceResult;
    use crate::models::messages::Recipient;
    use crate::models::notifications::NotificationKind;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Notification>>);

    impl Notifier for Recorder {
        fn notify(&self, notification: &Notification) -> ServiceResult<()> {
            self.0.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    struct Unmounted;

    impl Notifier for Unmounted {
        fn notify(&self, _: &Notification) -> ServiceResult<()> {
            Err(AppError::NotificationsDeliveryFailed)
        }
    }

    fn message(recipient: &str, gifts: &[&str]) -> Message {
        Message {
            id: "m1".to_string(),
            content: "be mine".to_string(),
            recipient: Recipient::parse(recipient).unwrap(),
            sender: "x".to_string(),
            gifts: gifts.iter().map(|gift| gift.to_string()).collect(),
            replies_count: 0,
            deleted: false,
            created: Utc::now(),
            sender_details: None,
        }
    }

    fn viewer() -> Viewer {
        Viewer::new("user123", "details123", "202012345678")
    }

    #[test]
    fn notifies_the_recipient_of_a_plain_message() {
        let notification = message_notification(Some(&viewer()), &message("202012345678", &[]));
        assert_eq!(notification, Some(Notification::success(NEW_MESSAGE_TEXT)));
    }

    #[test]
    fn gift_messages_use_the_gift_text() {
        let notification =
            message_notification(Some(&viewer()), &message("202012345678", &["gift1"]));
        assert_eq!(notification, Some(Notification::success(NEW_GIFT_MESSAGE_TEXT)));
    }

    #[test]
    fn broadcasts_other_recipients_and_guests_are_quiet() {
        assert!(message_notification(Some(&viewer()), &message("everyone", &[])).is_none());
        assert!(message_notification(Some(&viewer()), &message("202087654321", &[])).is_none());
        assert!(message_notification(None, &message("202012345678", &[])).is_none());
    }

    #[test]
    fn inline_errors_skip_the_global_notifier() {
        let recorder = Recorder::default();
        catch_and_notify_error(&recorder, AppError::FeedsFetchFailed);
        catch_and_notify_error(&recorder, AppError::FeedsSubscriptionFailed);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_errors_use_the_generic_text() {
        let recorder = Recorder::default();
        catch_and_notify_error(&recorder, AppError::Unexpected);
        let notifications = recorder.0.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Error);
        assert_eq!(notifications[0].text, "Unknown error.");
    }

    #[test]
    fn delivery_failures_are_dropped() {
        deliver(&Unmounted, &Notification::success(NEW_MESSAGE_TEXT));
    }
}
