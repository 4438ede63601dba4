pub mod feeds;
pub mod messages;
pub mod notifications;
pub mod sessions;
