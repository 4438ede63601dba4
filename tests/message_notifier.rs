mod common;

use common::{ME, STRANGER, TestContext, created, record, viewer};
use std::sync::atomic::Ordering;
use valentine_wall::entities::realtime::{RealtimeAction, RealtimeEvent};
use valentine_wall::models::notifications::NotificationMode;
use valentine_wall::repositories::messages::inbox_filter;
use valentine_wall::usecases::notifications::{NEW_GIFT_MESSAGE_TEXT, NEW_MESSAGE_TEXT};
use valentine_wall::usecases::sessions::AuthSession;
use valentine_wall::workers::daemons::message_notifier::MessageNotifier;

#[tokio::test]
async fn announces_each_message_once() {
    let ctx = TestContext::new();
    let notifier = MessageNotifier::start(ctx.clone(), viewer()).await.unwrap();
    let inbox = inbox_filter(ME);
    assert_eq!(ctx.collections.active_subscriptions(), [inbox.clone()]);

    ctx.collections.emit(&inbox, created(record("m1", ME, 0, 0)));
    ctx.collections.emit(&inbox, created(record("m1", ME, 0, 0)));
    ctx.collections.emit(&inbox, created(record("m2", ME, 1, 1)));
    ctx.collections.emit(
        &inbox,
        RealtimeEvent {
            action: RealtimeAction::Update,
            record: record("m3", ME, 0, 2),
        },
    );

    assert_eq!(ctx.notifier.texts(), [NEW_MESSAGE_TEXT, NEW_GIFT_MESSAGE_TEXT]);
    assert!(notifier.is_running());
}

#[tokio::test]
async fn ignores_messages_for_someone_else() {
    let ctx = TestContext::new();
    let _notifier = MessageNotifier::start(ctx.clone(), viewer()).await.unwrap();
    let inbox = inbox_filter(ME);

    ctx.collections.emit(&inbox, created(record("b1", "everyone", 0, 0)));
    ctx.collections.emit(&inbox, created(record("s1", STRANGER, 0, 1)));
    assert!(ctx.notifier.texts().is_empty());
}

#[tokio::test]
async fn stop_releases_the_subscription() {
    let ctx = TestContext::new();
    let notifier = MessageNotifier::start(ctx.clone(), viewer()).await.unwrap();

    notifier.stop();
    notifier.stop();
    assert!(!notifier.is_running());
    assert_eq!(ctx.collections.unsubscribes.load(Ordering::SeqCst), 1);

    ctx.collections.emit_late(created(record("m1", ME, 0, 0)));
    assert!(ctx.notifier.texts().is_empty());
}

#[tokio::test]
async fn logout_is_idempotent() {
    let ctx = TestContext::new();
    let session = AuthSession::start(ctx.clone(), viewer(), NotificationMode::Central)
        .await
        .unwrap();
    assert!(session.is_notifying());

    session.logout();
    session.logout();
    assert!(!session.is_notifying());
    assert_eq!(ctx.collections.unsubscribes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn view_mode_sessions_run_no_notifier() {
    let ctx = TestContext::new();
    let session = AuthSession::start(ctx.clone(), viewer(), NotificationMode::View)
        .await
        .unwrap();
    assert!(!session.is_notifying());
    assert!(ctx.collections.active_subscriptions().is_empty());
    session.logout();
}
