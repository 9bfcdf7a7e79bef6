use std::time::Duration;

use tracing::debug;
use url::Url;

use super::{ProbeError, ProbeResult, Prober, Stopwatch, millis};

/// HTTP/HTTPS prober
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(user_agent: &str) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ProbeError::Request(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn parse_target(target: &str) -> Result<Url, ProbeError> {
    let url = Url::parse(target).map_err(|e| ProbeError::InvalidTarget(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ProbeError::InvalidTarget(format!("unsupported URL scheme: {other}"))),
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self, timeout: Duration, target: &str) -> Result<ProbeResult, ProbeError> {
        let url = parse_target(target)?;
        let watch = Stopwatch::start();

        let response = self.client.get(url).timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout(millis(timeout))
            } else if e.is_connect() {
                ProbeError::Connect(e.to_string())
            } else {
                ProbeError::Request(e.to_string())
            }
        })?;

        let done = watch.done();
        let status = response.status();

        // 2xx and 3xx count as reachable
        if !(status.is_success() || status.is_redirection()) {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let result = ProbeResult::http(watch.started_at(), done, status.as_u16());
        debug!(target, latency = result.latency(), status = status.as_u16(), "http probe succeeded");
        Ok(result)
    }
}
