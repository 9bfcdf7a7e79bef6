//! Checker - probe-and-status engine for synthetic monitoring
//!
//! One invocation takes a check request, probes the target with bounded
//! retries, decides whether the monitor's status changed, and hands the
//! measurement plus any status transition to the telemetry collaborators.

pub mod backoff;
pub mod config;
pub mod handler;
pub mod metrics;
pub mod probe;
pub mod region;
pub mod request;
pub mod response;
pub mod status;
pub mod telemetry;

// Re-export main types
pub use backoff::{Backoff, Exhausted, resolve_attempts};
pub use config::CheckerConfig;
pub use handler::{CheckHandler, CheckHandlerBuilder, CheckOutcome, OnDemandOutcome};
pub use probe::{ProbeError, ProbeResult, Prober, Protocol};
pub use region::{RegionRouter, RouteDecision};
pub use request::{CheckRequest, OnDemandRequest, RawCheckRequest, Trigger, ValidationError};
pub use response::{CheckResponse, UnreachableMessage};
pub use status::{MonitorStatus, StatusDecision};
pub use telemetry::{CheckEvent, StatusUpdate, TelemetryEmitter, TelemetryError};

/// Attempts made when the caller does not ask for a specific retry count
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Upper bound on a single probe timeout, in milliseconds
pub const MAX_TIMEOUT_MS: u64 = 300_000;
