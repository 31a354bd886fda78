//! The hub server: accept loop and configuration.

pub mod config;
pub mod listener;

pub use config::HubConfig;
pub use listener::HubServer;
