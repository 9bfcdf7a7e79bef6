//! Monitor status decisions with hysteresis.
//!
//! The engine holds no state between calls: the caller supplies the status
//! it last asserted and gets back the status to report plus whether a
//! status-store write is needed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operational status of a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Active,
    Degraded,
    Error,
}

impl MonitorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MonitorStatus::Active => "active",
            MonitorStatus::Degraded => "degraded",
            MonitorStatus::Error => "error",
        }
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status label is not one of `active`, `degraded`, `error`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown monitor status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for MonitorStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MonitorStatus::Active),
            "degraded" => Ok(MonitorStatus::Degraded),
            "error" => Ok(MonitorStatus::Error),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Status computed for one check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDecision {
    pub status: MonitorStatus,
    /// Whether the status store must be told about `status`
    pub transition: bool,
}

impl StatusDecision {
    /// Decide the status after a successful probe.
    ///
    /// Without a `degraded_after` threshold every success is `active`. With
    /// one, latency at or above the threshold is `degraded`. A transition is
    /// only reported when the result differs from `previous`.
    pub fn from_latency(
        latency_ms: u64,
        degraded_after_ms: Option<u64>,
        previous: Option<MonitorStatus>,
    ) -> Self {
        let status = match degraded_after_ms {
            Some(threshold) if latency_ms >= threshold => MonitorStatus::Degraded,
            _ => MonitorStatus::Active,
        };

        Self { status, transition: previous != Some(status) }
    }

    /// Decide the status after every attempt failed.
    ///
    /// Always a transition, since each failure carries a fresh error message.
    pub fn exhausted() -> Self {
        Self { status: MonitorStatus::Error, transition: true }
    }
}
