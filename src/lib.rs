pub mod agent;
pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod platform;
pub mod server;
pub mod shutdown;
pub mod workflow;

#[cfg(test)]
mod testing;
