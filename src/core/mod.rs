pub mod app;
pub mod buffer;
pub mod config;
pub mod editing;
pub mod message;
pub mod tasks;
pub mod users;
