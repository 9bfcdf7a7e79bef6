//! Region affinity for inbound check requests.
//!
//! In a geo-distributed deployment a request can land on the wrong point of
//! presence. The router only decides; re-delivery is up to the caller's proxy.

/// Request header carrying the caller's preferred region
pub const PREFER_REGION_HEADER: &str = "fly-prefer-region";

/// Response header asking the proxy to replay the request elsewhere
pub const REPLAY_HEADER: &str = "fly-replay";

/// Outcome of a routing decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Handle the request here
    Proceed,
    /// Hand the request back to the proxy for the named region
    Forward { region: String },
}

impl RouteDecision {
    /// Value of the outbound replay header, if forwarding
    pub fn replay_hint(&self) -> Option<String> {
        match self {
            RouteDecision::Proceed => None,
            RouteDecision::Forward { region } => Some(format!("region={region}")),
        }
    }
}

/// Decides whether a request belongs to this instance's region
#[derive(Debug, Clone)]
pub struct RegionRouter {
    region: String,
    enabled: bool,
}

impl RegionRouter {
    /// Router bound to `region` that forwards on mismatch
    pub fn new(region: impl Into<String>) -> Self {
        Self { region: region.into(), enabled: true }
    }

    /// Router that always proceeds, for deployments without a routing proxy
    pub fn disabled(region: impl Into<String>) -> Self {
        Self { region: region.into(), enabled: false }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn route(&self, preferred: Option<&str>) -> RouteDecision {
        match preferred.map(str::trim) {
            Some(preferred) if self.enabled && !preferred.is_empty() && preferred != self.region => {
                RouteDecision::Forward { region: preferred.to_string() }
            }
            _ => RouteDecision::Proceed,
        }
    }
}
