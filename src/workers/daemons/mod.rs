pub mod feed_watcher;
pub mod message_notifier;
