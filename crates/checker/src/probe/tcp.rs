use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout as with_timeout;
use tracing::debug;

use super::{ProbeError, ProbeResult, Prober, Stopwatch, millis};

/// TCP connect prober
///
/// A probe succeeds once the three-way handshake completes; the connection is
/// dropped immediately afterwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Prober for TcpProber {
    async fn probe(&self, timeout: Duration, target: &str) -> Result<ProbeResult, ProbeError> {
        if target.is_empty() {
            return Err(ProbeError::InvalidTarget("empty address".to_string()));
        }

        let watch = Stopwatch::start();

        let stream = with_timeout(timeout, TcpStream::connect(target))
            .await
            .map_err(|_| ProbeError::Timeout(millis(timeout)))?
            .map_err(|e| ProbeError::Connect(e.to_string()))?;
        drop(stream);

        let result = ProbeResult::tcp(watch.started_at(), watch.done());
        debug!(target, latency = result.latency(), "tcp probe succeeded");
        Ok(result)
    }
}
