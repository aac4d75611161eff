pub mod config;
pub mod connection;
pub mod engine;
pub mod history;
pub mod message;
pub mod mock;
pub mod render;
pub mod schedule;
pub mod session;
