//! Keeps the selected Home Assistant instance reachable.
//!
//! [`AvailabilityMonitor`] probes the current instance on a fixed interval
//! and reports when the error view should be shown or cleared. When the
//! instance cannot be reached at all and automatic switching is on, it
//! looks for another registered instance: first among those announcing
//! themselves over mDNS, then by probing each one in registry order.

pub mod failover;
pub mod monitor;
pub mod probe;
pub mod types;

pub use failover::{Alternate, FoundVia, InstanceLocator, find_alternate, match_announcement};
pub use monitor::AvailabilityMonitor;
pub use probe::{HttpProbe, LivenessProbe, probe_url};
pub use types::{
    AvailabilityEvent, DISCOVERY_WINDOW, PROBE_INTERVAL, PROBE_PATH, PROBE_TIMEOUT, ProbeOutcome,
};

/// Errors for setting up probing.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
