pub mod collections;
pub mod messages;
pub mod users;
