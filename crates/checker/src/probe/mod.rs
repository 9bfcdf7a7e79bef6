//! Single-attempt measurement primitives.
//!
//! A [`Prober`] opens one connection (or performs one request) against a
//! target and reports when the attempt started and when it finished. It knows
//! nothing about retries, status or telemetry.

mod http;
mod tcp;

pub use http::HttpProber;
pub use tcp::TcpProber;

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Protocol used to probe a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Http,
}

impl Protocol {
    /// Event stream receiving scheduled monitor measurements
    pub fn monitor_stream(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp_response__v0",
            Protocol::Http => "http_response__v0",
        }
    }

    /// Event stream receiving on-demand region measurements
    pub fn on_demand_stream(self) -> &'static str {
        match self {
            Protocol::Tcp => "check_tcp_response__v1",
            Protocol::Http => "check_http_response__v1",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Http => "http",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Protocol::Tcp),
            "http" => Ok(Protocol::Http),
            other => Err(ProbeError::InvalidTarget(format!("unsupported protocol: {other}"))),
        }
    }
}

/// Why a single probe attempt failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status code: {0}")]
    Status(u16),

    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

/// Protocol-specific phase timings, all epoch milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProbeTiming {
    #[serde(rename_all = "camelCase")]
    Tcp { tcp_start: i64, tcp_done: i64 },
    #[serde(rename_all = "camelCase")]
    Http { request_start: i64, response_done: i64, status_code: u16 },
}

/// Outcome of one successful probe attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub start: i64,
    pub done: i64,
    pub timing: ProbeTiming,
}

impl ProbeResult {
    pub fn tcp(start: i64, done: i64) -> Self {
        Self { start, done, timing: ProbeTiming::Tcp { tcp_start: start, tcp_done: done } }
    }

    pub fn http(start: i64, done: i64, status_code: u16) -> Self {
        Self {
            start,
            done,
            timing: ProbeTiming::Http { request_start: start, response_done: done, status_code },
        }
    }

    /// Latency in milliseconds (`done - start`)
    pub fn latency(&self) -> u64 {
        u64::try_from(self.done - self.start).unwrap_or(0)
    }
}

/// Uniform single-attempt probing capability
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Perform one attempt against `target`, giving up after `timeout`
    async fn probe(&self, timeout: Duration, target: &str) -> Result<ProbeResult, ProbeError>;
}

/// Wall-clock start anchored to a monotonic clock.
///
/// `done` is derived from the monotonic elapsed time, so it never precedes
/// `start` even if the wall clock steps backwards mid-attempt.
pub(crate) struct Stopwatch {
    started_at: i64,
    instant: Instant,
}

impl Stopwatch {
    pub(crate) fn start() -> Self {
        Self { started_at: now_millis(), instant: Instant::now() }
    }

    pub(crate) fn started_at(&self) -> i64 {
        self.started_at
    }

    pub(crate) fn done(&self) -> i64 {
        let elapsed = i64::try_from(self.instant.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.started_at.saturating_add(elapsed)
    }
}

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
