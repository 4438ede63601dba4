pub mod console;
pub mod discord;
pub mod pocketbase;
pub mod sse;
