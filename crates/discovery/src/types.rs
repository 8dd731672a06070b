use std::net::IpAddr;

use mdns_sd::ServiceInfo;
use serde::{Deserialize, Serialize};

/// mDNS service type announced by Home Assistant.
pub const SERVICE_NAME: &str = "_home-assistant._tcp";

/// A Home Assistant instance announced on the local network.
///
/// The URL fields come from the TXT record and are passed through as
/// announced; any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredInstance {
    /// Full mDNS instance name.
    pub name: String,
    pub host: String,
    pub port: u16,
    #[serde(skip)]
    pub ips: Vec<IpAddr>,
    pub internal_url: Option<String>,
    pub external_url: Option<String>,
    pub base_url: Option<String>,
    pub location_name: Option<String>,
    pub uuid: Option<String>,
    pub version: Option<String>,
}

impl DiscoveredInstance {
    /// Builds an instance from a resolved mDNS service.
    pub fn from_service_info(info: &ServiceInfo) -> Self {
        let txt = |key: &str| {
            info.get_property_val_str(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        // Loopback and link-local addresses are useless to other machines.
        let mut ips: Vec<IpAddr> = info
            .get_addresses()
            .iter()
            .copied()
            .filter(|ip| match ip {
                IpAddr::V4(v4) => !v4.is_loopback() && !v4.is_link_local(),
                IpAddr::V6(_) => false,
            })
            .collect();
        ips.sort();

        Self {
            name: info.get_fullname().to_string(),
            host: info.get_hostname().to_string(),
            port: info.get_port(),
            ips,
            internal_url: txt("internal_url"),
            external_url: txt("external_url"),
            base_url: txt("base_url"),
            location_name: txt("location_name"),
            uuid: txt("uuid"),
            version: txt("version"),
        }
    }

    /// URLs the instance says it can be reached at, internal first.
    pub fn advertised_urls(&self) -> impl Iterator<Item = &str> {
        [self.internal_url.as_deref(), self.external_url.as_deref()]
            .into_iter()
            .flatten()
    }

    /// Returns the address (IP:port or host:port) the service resolved to.
    pub fn address(&self) -> String {
        if let Some(ip) = self.ips.first() {
            format!("{ip}:{}", self.port)
        } else {
            format!("{}:{}", self.host.trim_end_matches('.'), self.port)
        }
    }

    /// Human-readable name for logs and menus.
    pub fn display_name(&self) -> &str {
        self.location_name.as_deref().unwrap_or(&self.name)
    }
}
