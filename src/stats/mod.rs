//! Hub-wide counters, exposed through the diagnostic surface.

pub mod metrics;

pub use metrics::{HubStats, HubStatsSnapshot};
