//! Picking another instance when the current one is gone.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use hadesk_discovery::{Client, DiscoveredInstance, DiscoveryError};
use hadesk_settings::InstanceRegistry;
use tracing::{debug, warn};

use crate::probe::LivenessProbe;
use crate::types::ProbeOutcome;

/// Finds registered instances that announce themselves on the network.
pub trait InstanceLocator: Send + Sync {
    /// Returns the first of `candidates` seen announcing itself within
    /// `window`.
    fn locate(
        &self,
        candidates: Vec<String>,
        window: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, DiscoveryError>> + Send + '_>>;
}

impl InstanceLocator for Client {
    fn locate(
        &self,
        candidates: Vec<String>,
        window: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, DiscoveryError>> + Send + '_>> {
        Box::pin(async move {
            let found = self
                .find(window, |instance| {
                    match_announcement(instance, &candidates).is_some()
                })
                .await?;
            Ok(found.and_then(|instance| match_announcement(&instance, &candidates)))
        })
    }
}

/// Returns the candidate an announcement refers to, checking its internal
/// URL before its external one. Trailing slashes are ignored.
pub fn match_announcement(instance: &DiscoveredInstance, candidates: &[String]) -> Option<String> {
    instance.advertised_urls().find_map(|url| {
        let url = url.trim_end_matches('/');
        candidates
            .iter()
            .find(|c| c.trim_end_matches('/') == url)
            .cloned()
    })
}

/// How an alternate instance was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoundVia {
    Discovery,
    Probe,
}

impl fmt::Display for FoundVia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoundVia::Discovery => write!(f, "mdns"),
            FoundVia::Probe => write!(f, "probe"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternate {
    pub url: String,
    pub via: FoundVia,
}

/// Looks for a usable instance other than the current one.
///
/// mDNS announcements are consulted first. Failing that, the other
/// instances are probed one at a time in registry order and the first
/// healthy one wins. A failing candidate never stops the scan.
pub async fn find_alternate(
    registry: &InstanceRegistry,
    probe: &dyn LivenessProbe,
    locator: &dyn InstanceLocator,
    window: Duration,
) -> Option<Alternate> {
    let candidates: Vec<String> = registry.others().map(str::to_string).collect();
    if candidates.is_empty() {
        return None;
    }

    match locator.locate(candidates.clone(), window).await {
        Ok(Some(url)) => {
            return Some(Alternate {
                url,
                via: FoundVia::Discovery,
            });
        }
        Ok(None) => debug!("no registered instance announced itself"),
        Err(e) => warn!(error = %e, "mDNS discovery failed, probing instead"),
    }

    for url in candidates {
        match probe.probe(&url).await {
            ProbeOutcome::Healthy => {
                return Some(Alternate {
                    url,
                    via: FoundVia::Probe,
                });
            }
            outcome => debug!(url = %url, %outcome, "candidate unavailable"),
        }
    }
    None
}
