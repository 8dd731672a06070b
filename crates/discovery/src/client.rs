use std::time::{Duration, Instant};

use mdns_sd::{ServiceDaemon, ServiceEvent};
use tracing::{debug, warn};

use crate::DiscoveryError;
use crate::types::{DiscoveredInstance, SERVICE_NAME};

/// How long a single blocking receive waits before checking the deadline.
const RECV_SLICE: Duration = Duration::from_millis(100);

/// Browses the local network for Home Assistant instances via mDNS/DNS-SD.
#[derive(Debug, Clone)]
pub struct Client {
    service_type: String,
}

impl Client {
    /// Creates a client browsing for [`SERVICE_NAME`].
    pub fn new() -> Self {
        Self::with_service_type(SERVICE_NAME)
    }

    /// Creates a client for another service type, e.g. `_foo._tcp`.
    pub fn with_service_type(service: &str) -> Self {
        Self {
            service_type: format!("{}.local.", service.trim_end_matches('.')),
        }
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// Collects every instance announced before `timeout` runs out.
    ///
    /// Repeated announcements of the same service are reported once.
    pub async fn discover(
        &self,
        timeout: Duration,
    ) -> Result<Vec<DiscoveredInstance>, DiscoveryError> {
        let mut found: Vec<DiscoveredInstance> = Vec::new();
        self.browse(timeout, |instance| {
            if !found.iter().any(|f| f.name == instance.name) {
                found.push(instance);
            }
            false
        })
        .await?;
        Ok(found)
    }

    /// Returns the first announced instance accepted by `predicate`, or
    /// `None` once `timeout` runs out.
    pub async fn find<F>(
        &self,
        timeout: Duration,
        mut predicate: F,
    ) -> Result<Option<DiscoveredInstance>, DiscoveryError>
    where
        F: FnMut(&DiscoveredInstance) -> bool,
    {
        let mut hit = None;
        self.browse(timeout, |instance| {
            if predicate(&instance) {
                hit = Some(instance);
                true
            } else {
                false
            }
        })
        .await?;
        Ok(hit)
    }

    /// Feeds resolved services to `on_instance` until it returns true or
    /// the deadline passes.
    async fn browse<F>(&self, timeout: Duration, mut on_instance: F) -> Result<(), DiscoveryError>
    where
        F: FnMut(DiscoveredInstance) -> bool,
    {
        let daemon = ServiceDaemon::new()
            .map_err(|e| DiscoveryError::Mdns(format!("failed to create mDNS daemon: {e}")))?;

        let receiver = match daemon.browse(&self.service_type) {
            Ok(rx) => rx,
            Err(e) => {
                let _ = daemon.shutdown();
                return Err(DiscoveryError::Mdns(format!("failed to browse mDNS: {e}")));
            }
        };

        debug!(service = %self.service_type, ?timeout, "browsing");
        let deadline = Instant::now() + timeout;

        while Instant::now() < deadline {
            // recv_timeout blocks, so it runs off the async workers.
            let event = tokio::time::timeout(
                deadline.saturating_duration_since(Instant::now()),
                tokio::task::spawn_blocking({
                    let receiver = receiver.clone();
                    move || receiver.recv_timeout(RECV_SLICE)
                }),
            )
            .await;

            let Ok(Ok(Ok(ServiceEvent::ServiceResolved(info)))) = event else {
                continue;
            };

            let instance = DiscoveredInstance::from_service_info(&info);
            debug!(
                name = %instance.name,
                address = %instance.address(),
                internal_url = ?instance.internal_url,
                external_url = ?instance.external_url,
                "instance resolved"
            );
            if on_instance(instance) {
                break;
            }
        }

        if let Err(e) = daemon.shutdown() {
            warn!(error = %e, "mDNS daemon shutdown failed");
        }
        Ok(())
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_service_type() {
        assert_eq!(Client::new().service_type(), "_home-assistant._tcp.local.");
    }

    #[test]
    fn custom_service_type_is_qualified_once() {
        assert_eq!(
            Client::with_service_type("_test._tcp").service_type(),
            "_test._tcp.local."
        );
        assert_eq!(
            Client::with_service_type("_test._tcp.").service_type(),
            "_test._tcp.local."
        );
    }
}
