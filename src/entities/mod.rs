pub mod messages;
pub mod pages;
pub mod realtime;
pub mod users;
