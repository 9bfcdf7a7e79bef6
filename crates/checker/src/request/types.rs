use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::validation::{
    ValidationError, non_zero, parse_id, parse_previous_status, parse_trigger, validate_target,
    validate_timeout,
};
use crate::status::MonitorStatus;

/// Origin of a check invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Scheduled tick
    #[default]
    Cron,
    /// On-demand call
    Api,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Cron => "cron",
            Trigger::Api => "api",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trigger {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cron" => Ok(Trigger::Cron),
            "api" => Ok(Trigger::Api),
            other => Err(ValidationError::Trigger(other.to_string())),
        }
    }
}

/// Where to export metrics for an on-demand check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtelConfig {
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Check request as it arrives on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCheckRequest {
    /// Decimal workspace id
    #[serde(default)]
    pub workspace_id: String,

    /// Decimal monitor id
    #[serde(default)]
    pub monitor_id: String,

    /// Target address (`host:port` for TCP, URL for HTTP)
    #[serde(default)]
    pub uri: String,

    /// Per-attempt timeout in milliseconds
    #[serde(default)]
    pub timeout: u64,

    /// Attempt budget override; `0` means default
    pub retry: Option<u32>,

    pub trigger: Option<String>,

    /// Schedule tick this check satisfies, epoch ms
    pub cron_timestamp: Option<i64>,

    /// Status the monitor was last recorded with
    pub status: Option<String>,

    /// Latency threshold for `degraded`, in milliseconds; `0` means none
    pub degraded_after: Option<u64>,

    /// Correlation id of an on-demand check
    pub request_id: Option<i64>,

    pub otel_config: Option<OtelConfig>,
}

/// A validated scheduled monitor check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub workspace_id: i64,
    pub monitor_id: i64,
    pub target: String,
    pub timeout: Duration,
    pub retry: Option<u32>,
    pub trigger: Trigger,
    pub cron_timestamp: Option<i64>,
    pub request_id: Option<i64>,
    pub previous_status: Option<MonitorStatus>,
    pub degraded_after: Option<u64>,
}

impl TryFrom<RawCheckRequest> for CheckRequest {
    type Error = ValidationError;

    fn try_from(raw: RawCheckRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            workspace_id: parse_id(&raw.workspace_id, ValidationError::WorkspaceId)?,
            monitor_id: parse_id(&raw.monitor_id, ValidationError::MonitorId)?,
            target: validate_target(&raw.uri)?,
            timeout: validate_timeout(raw.timeout)?,
            retry: raw.retry,
            trigger: parse_trigger(raw.trigger.as_deref())?,
            cron_timestamp: raw.cron_timestamp,
            request_id: non_zero(raw.request_id),
            previous_status: parse_previous_status(raw.status.as_deref()),
            degraded_after: non_zero(raw.degraded_after),
        })
    }
}

/// A validated on-demand region check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnDemandRequest {
    pub target: String,
    pub timeout: Duration,
    pub cron_timestamp: Option<i64>,
    pub request_id: Option<i64>,
    pub otel: Option<OtelConfig>,
}

impl TryFrom<RawCheckRequest> for OnDemandRequest {
    type Error = ValidationError;

    fn try_from(raw: RawCheckRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            target: validate_target(&raw.uri)?,
            timeout: validate_timeout(raw.timeout)?,
            cron_timestamp: raw.cron_timestamp,
            request_id: non_zero(raw.request_id),
            otel: raw.otel_config.filter(|otel| !otel.endpoint.trim().is_empty()),
        })
    }
}
