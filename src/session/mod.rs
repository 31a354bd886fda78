//! Per-connection state and the task that drives a connection.

pub(crate) mod connection;
pub mod state;

pub use state::SessionState;
