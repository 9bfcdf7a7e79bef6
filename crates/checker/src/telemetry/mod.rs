//! Telemetry emission.
//!
//! Two independent, best-effort side effects leave this module: the
//! measurement event for the analytics sink and the status update for the
//! status store. They are not transactional with each other; a crash between
//! the two can leave a measurement without its status update.

mod emitter;
mod event;
mod sink;
mod store;

pub use emitter::TelemetryEmitter;
pub use event::{CheckEvent, StatusUpdate};
pub use sink::{AnalyticsSink, EventsApiSink, TracingSink};
pub use store::{HttpStatusStore, StatusStore, TracingStatusStore};

use thiserror::Error;

/// Delivery failure to an external collaborator
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{target} rejected delivery with status {status}")]
    Rejected { target: &'static str, status: u16 },

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}
