//! Optional export of on-demand check results to a caller-supplied endpoint.

use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;
use tracing::warn;

use crate::request::OtelConfig;
use crate::response::CheckResponse;
use crate::telemetry::TelemetryError;

/// Receives the response of an on-demand check for export
#[async_trait::async_trait]
pub trait MetricsRecorder: Send + Sync {
    async fn record(
        &self,
        config: &OtelConfig,
        region: &str,
        uri: &str,
        response: &CheckResponse,
    ) -> Result<(), TelemetryError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsPayload<'a> {
    region: &'a str,
    uri: &'a str,
    check_type: &'static str,
    #[serde(flatten)]
    response: &'a CheckResponse,
}

/// Posts the response as JSON to `config.endpoint` with `config.headers`
pub struct HttpMetricsExporter {
    client: reqwest::Client,
}

impl HttpMetricsExporter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl MetricsRecorder for HttpMetricsExporter {
    async fn record(
        &self,
        config: &OtelConfig,
        region: &str,
        uri: &str,
        response: &CheckResponse,
    ) -> Result<(), TelemetryError> {
        let payload = MetricsPayload {
            region,
            uri,
            check_type: response.job_type.as_str(),
            response,
        };

        let mut request = self.client.post(config.endpoint.as_str()).json(&payload);
        for (name, value) in &config.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => request = request.header(name, value),
                _ => warn!(header = %name, "skipping invalid metrics export header"),
            }
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(TelemetryError::Rejected {
                target: "metrics endpoint",
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}
