//! HTTP liveness probe.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::trace;

use crate::ProbeError;
use crate::types::{PROBE_PATH, PROBE_TIMEOUT, ProbeOutcome};

/// Checks whether an instance is up.
///
/// Implemented over HTTP by [`HttpProbe`]; tests substitute their own.
pub trait LivenessProbe: Send + Sync {
    fn probe(&self, instance: &str) -> Pin<Box<dyn Future<Output = ProbeOutcome> + Send + '_>>;
}

/// Full probe URL for an instance base URL.
pub fn probe_url(instance: &str) -> String {
    format!("{}{PROBE_PATH}", instance.trim_end_matches('/'))
}

/// Probes `GET <instance>/auth/providers` with a request timeout.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_timeout(PROBE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hadesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl LivenessProbe for HttpProbe {
    fn probe(&self, instance: &str) -> Pin<Box<dyn Future<Output = ProbeOutcome> + Send + '_>> {
        let url = probe_url(instance);
        Box::pin(async move {
            let outcome = match self.client.get(&url).send().await {
                Ok(resp) if resp.status() == StatusCode::OK => ProbeOutcome::Healthy,
                Ok(resp) => ProbeOutcome::Unhealthy(resp.status().as_u16()),
                Err(e) => ProbeOutcome::Unreachable(e.to_string()),
            };
            trace!(url = %url, %outcome, "probed");
            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers one request with `status` and returns the request line.
    async fn serve_once(status: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let task = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = stream.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response =
                format!("HTTP/1.1 {status}\r\nContent-Length: 2\r\nConnection: close\r\n\r\n[]");
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            request.lines().next().unwrap_or_default().to_string()
        });
        (base, task)
    }

    #[test]
    fn probe_url_trims_trailing_slashes() {
        assert_eq!(probe_url("https://ha.local:8123"), "https://ha.local:8123/auth/providers");
        assert_eq!(probe_url("https://ha.local:8123//"), "https://ha.local:8123/auth/providers");
    }

    #[tokio::test]
    async fn ok_is_healthy() {
        let (base, server) = serve_once("200 OK").await;
        let probe = HttpProbe::new().unwrap();

        let outcome = probe.probe(&format!("{base}/")).await;
        assert_eq!(outcome, ProbeOutcome::Healthy);
        assert_eq!(server.await.unwrap(), "GET /auth/providers HTTP/1.1");
    }

    #[tokio::test]
    async fn other_status_is_unhealthy() {
        let (base, server) = serve_once("502 Bad Gateway").await;
        let probe = HttpProbe::new().unwrap();

        assert_eq!(probe.probe(&base).await, ProbeOutcome::Unhealthy(502));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let probe = HttpProbe::new().unwrap();
        assert!(matches!(probe.probe(&base).await, ProbeOutcome::Unreachable(_)));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let _server = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let probe = HttpProbe::with_timeout(Duration::from_millis(200)).unwrap();
        assert!(matches!(probe.probe(&base).await, ProbeOutcome::Unreachable(_)));
    }
}
