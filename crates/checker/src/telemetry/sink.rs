use reqwest::header::CONTENT_TYPE;
use tracing::info;
use url::Url;

use super::{CheckEvent, TelemetryError};

/// External analytics sink receiving check events
#[async_trait::async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// Append `event` to the named event stream
    async fn send_event(&self, stream: &str, event: &CheckEvent) -> Result<(), TelemetryError>;
}

/// Events API client: `POST {endpoint}/v0/events?name=<stream>` with NDJSON
pub struct EventsApiSink {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl EventsApiSink {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        token: Option<String>,
    ) -> Result<Self, TelemetryError> {
        let base = format!("{}/v0/events", endpoint.trim_end_matches('/'));
        Ok(Self { client, endpoint: Url::parse(&base)?, token })
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for EventsApiSink {
    async fn send_event(&self, stream: &str, event: &CheckEvent) -> Result<(), TelemetryError> {
        let mut body = serde_json::to_string(event)?;
        body.push('\n');

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .query(&[("name", stream)])
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(body);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(TelemetryError::Rejected {
                target: "analytics sink",
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

/// Sink that only logs events, used when no analytics endpoint is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait::async_trait]
impl AnalyticsSink for TracingSink {
    async fn send_event(&self, stream: &str, event: &CheckEvent) -> Result<(), TelemetryError> {
        info!(
            stream,
            event_id = %event.id,
            monitor_id = ?event.monitor_id,
            latency = ?event.latency,
            error = event.error,
            status = ?event.request_status,
            "check event"
        );
        Ok(())
    }
}
