use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::probe::{ProbeResult, now_millis};
use crate::request::Trigger;
use crate::status::MonitorStatus;

/// Append-only record of one check, as sent to the analytics sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckEvent {
    /// Time-ordered unique id, fresh for every constructed event
    pub id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,

    /// Probe start (or failure time), epoch ms
    pub timestamp: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_timestamp: Option<i64>,

    /// Set only for successful probes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<u64>,

    /// Serialized protocol timings; empty on error
    pub timing: String,

    /// 1 when every attempt failed
    pub error: u8,

    pub error_message: String,

    pub region: String,

    pub trigger: Trigger,

    pub uri: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_status: Option<MonitorStatus>,
}

impl CheckEvent {
    /// Event for a successful probe
    pub fn measurement(probe: &ProbeResult, region: &str, trigger: Trigger, uri: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            workspace_id: None,
            monitor_id: None,
            request_id: None,
            timestamp: probe.start,
            cron_timestamp: None,
            latency: Some(probe.latency()),
            timing: serde_json::to_string(&probe.timing).unwrap_or_default(),
            error: 0,
            error_message: String::new(),
            region: region.to_string(),
            trigger,
            uri: uri.to_string(),
            request_status: None,
        }
    }

    /// Event for a check whose attempts were all exhausted
    pub fn failure(message: impl Into<String>, region: &str, trigger: Trigger, uri: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            workspace_id: None,
            monitor_id: None,
            request_id: None,
            timestamp: now_millis(),
            cron_timestamp: None,
            latency: None,
            timing: String::new(),
            error: 1,
            error_message: message.into(),
            region: region.to_string(),
            trigger,
            uri: uri.to_string(),
            request_status: Some(MonitorStatus::Error),
        }
    }

    pub fn for_monitor(mut self, workspace_id: i64, monitor_id: i64) -> Self {
        self.workspace_id = Some(workspace_id);
        self.monitor_id = Some(monitor_id);
        self
    }

    pub fn with_request_id(mut self, request_id: Option<i64>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_cron_timestamp(mut self, cron_timestamp: Option<i64>) -> Self {
        self.cron_timestamp = cron_timestamp;
        self
    }

    pub fn with_status(mut self, status: MonitorStatus) -> Self {
        self.request_status = Some(status);
        self
    }

    pub fn is_error(&self) -> bool {
        self.error != 0
    }
}

/// Command for the external status store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub monitor_id: String,
    pub status: MonitorStatus,
    pub region: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_timestamp: Option<i64>,
}
