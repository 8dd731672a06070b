use std::fmt;
use std::time::Duration;

/// Time between two probes of the current instance.
pub const PROBE_INTERVAL: Duration = Duration::from_secs(3);

/// Upper bound for a single probe request.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// How long failover listens for mDNS announcements.
pub const DISCOVERY_WINDOW: Duration = Duration::from_secs(2);

/// Endpoint probed on every instance. Answers 200 without authentication.
pub const PROBE_PATH: &str = "/auth/providers";

/// Result of probing one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// HTTP 200.
    Healthy,
    /// The server answered with another status.
    Unhealthy(u16),
    /// No HTTP answer at all (DNS, connect, TLS, timeout).
    Unreachable(String),
}

impl ProbeOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Healthy)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Healthy => write!(f, "healthy"),
            ProbeOutcome::Unhealthy(status) => write!(f, "HTTP {status}"),
            ProbeOutcome::Unreachable(reason) => write!(f, "unreachable: {reason}"),
        }
    }
}

/// State changes reported by the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityEvent {
    /// The current instance failed; show the error view.
    Unavailable { instance: String, reason: String },
    /// The current instance answers again; clear the error view.
    Recovered { instance: String },
    /// Failover selected another instance.
    Switched { from: String, to: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_display() {
        assert_eq!(ProbeOutcome::Healthy.to_string(), "healthy");
        assert_eq!(ProbeOutcome::Unhealthy(502).to_string(), "HTTP 502");
        assert_eq!(
            ProbeOutcome::Unreachable("connection refused".into()).to_string(),
            "unreachable: connection refused"
        );
    }

    #[test]
    fn only_healthy_is_healthy() {
        assert!(ProbeOutcome::Healthy.is_healthy());
        assert!(!ProbeOutcome::Unhealthy(503).is_healthy());
        assert!(!ProbeOutcome::Unreachable(String::new()).is_healthy());
    }
}
