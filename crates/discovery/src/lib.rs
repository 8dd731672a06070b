pub mod client;
pub mod types;

// Re-export primary types.
pub use client::Client;
pub use types::{DiscoveredInstance, SERVICE_NAME};

/// Errors for discovery operations.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("mDNS error: {0}")]
    Mdns(String),
}
