use std::sync::Arc;

use tracing::{error, warn};

use super::{AnalyticsSink, CheckEvent, StatusStore, StatusUpdate};

/// Hands events and status updates to their collaborators.
///
/// Delivery failures are logged and swallowed: an unhealthy telemetry
/// pipeline must never turn into a failed check.
#[derive(Clone)]
pub struct TelemetryEmitter {
    sink: Arc<dyn AnalyticsSink>,
    store: Arc<dyn StatusStore>,
}

impl TelemetryEmitter {
    pub fn new(sink: Arc<dyn AnalyticsSink>, store: Arc<dyn StatusStore>) -> Self {
        Self { sink, store }
    }

    /// Send a measurement event, best effort
    pub async fn emit(&self, stream: &str, event: &CheckEvent) {
        if let Err(e) = self.sink.send_event(stream, event).await {
            error!(
                stream,
                event_id = %event.id,
                monitor_id = ?event.monitor_id,
                region = %event.region,
                error = %e,
                "failed to send check event"
            );
        }
    }

    /// Record a status transition, best effort
    pub async fn update_status(&self, update: &StatusUpdate) {
        if let Err(e) = self.store.update_status(update).await {
            warn!(
                monitor_id = %update.monitor_id,
                status = %update.status,
                region = %update.region,
                error = %e,
                "failed to update monitor status"
            );
        }
    }
}
