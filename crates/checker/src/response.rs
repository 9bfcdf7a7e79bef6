//! Response payloads returned to the caller.

use serde::{Deserialize, Serialize};

use crate::probe::{ProbeResult, ProbeTiming, Protocol};

/// Full measurement detail of a successful check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    /// Probe start, epoch ms
    pub timestamp: i64,
    pub timing: ProbeTiming,
    pub latency: u64,
    pub region: String,
    pub job_type: Protocol,
}

impl CheckResponse {
    pub fn from_probe(probe: &ProbeResult, region: &str, protocol: Protocol) -> Self {
        Self {
            timestamp: probe.start,
            timing: probe.timing.clone(),
            latency: probe.latency(),
            region: region.to_string(),
            job_type: protocol,
        }
    }
}

/// Informational body for an on-demand check whose target never answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreachableMessage {
    pub message: String,
}

impl Default for UnreachableMessage {
    fn default() -> Self {
        Self { message: "uri not reachable".to_string() }
    }
}
