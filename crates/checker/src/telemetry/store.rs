use reqwest::header::AUTHORIZATION;
use tracing::info;
use url::Url;

use super::{StatusUpdate, TelemetryError};

/// External store of monitor statuses; written to, never read back
#[async_trait::async_trait]
pub trait StatusStore: Send + Sync {
    async fn update_status(&self, update: &StatusUpdate) -> Result<(), TelemetryError>;
}

/// Status-update API client, authenticated with a shared secret
pub struct HttpStatusStore {
    client: reqwest::Client,
    endpoint: Url,
    secret: Option<String>,
}

impl HttpStatusStore {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        secret: Option<String>,
    ) -> Result<Self, TelemetryError> {
        Ok(Self { client, endpoint: Url::parse(endpoint)?, secret })
    }
}

#[async_trait::async_trait]
impl StatusStore for HttpStatusStore {
    async fn update_status(&self, update: &StatusUpdate) -> Result<(), TelemetryError> {
        let mut request = self.client.post(self.endpoint.clone()).json(update);

        if let Some(secret) = &self.secret {
            request = request.header(AUTHORIZATION, format!("Basic {secret}"));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(TelemetryError::Rejected {
                target: "status store",
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

/// Store that only logs updates, used when no status endpoint is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusStore;

#[async_trait::async_trait]
impl StatusStore for TracingStatusStore {
    async fn update_status(&self, update: &StatusUpdate) -> Result<(), TelemetryError> {
        info!(
            monitor_id = %update.monitor_id,
            status = %update.status,
            region = %update.region,
            message = ?update.message,
            "status update"
        );
        Ok(())
    }
}
