//! Request validation.
//!
//! Everything here runs before the first probe; a request that fails
//! validation never produces telemetry.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use super::types::Trigger;
use crate::MAX_TIMEOUT_MS;
use crate::status::MonitorStatus;

/// A structurally invalid check request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid workspace id: {0:?}")]
    WorkspaceId(String),

    #[error("invalid monitor id: {0:?}")]
    MonitorId(String),

    #[error("target is required")]
    MissingTarget,

    #[error("timeout must be between 1 and {max} ms, got {0}", max = MAX_TIMEOUT_MS)]
    Timeout(u64),

    #[error("unknown trigger: {0}")]
    Trigger(String),

    #[error("region is required")]
    MissingRegion,
}

/// Parse a decimal 64-bit identifier, exactly as sent
pub(super) fn parse_id(
    raw: &str,
    error: fn(String) -> ValidationError,
) -> Result<i64, ValidationError> {
    raw.parse::<i64>().map_err(|_| error(raw.to_string()))
}

pub(super) fn validate_target(target: &str) -> Result<String, ValidationError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(ValidationError::MissingTarget);
    }
    Ok(target.to_string())
}

pub(super) fn validate_timeout(timeout_ms: u64) -> Result<Duration, ValidationError> {
    if timeout_ms == 0 || timeout_ms > MAX_TIMEOUT_MS {
        return Err(ValidationError::Timeout(timeout_ms));
    }
    Ok(Duration::from_millis(timeout_ms))
}

/// Absent or empty triggers default to `cron`
pub(super) fn parse_trigger(raw: Option<&str>) -> Result<Trigger, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Trigger::Cron),
        Some(other) => other.parse(),
    }
}

/// Unknown status labels are treated as "no baseline"
pub(super) fn parse_previous_status(raw: Option<&str>) -> Option<MonitorStatus> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse() {
        Ok(status) => Some(status),
        Err(error) => {
            warn!(%error, "ignoring previous status");
            None
        }
    }
}

/// Zero means "not provided" for optional numeric fields
pub(super) fn non_zero<T: Default + PartialEq>(value: Option<T>) -> Option<T> {
    value.filter(|v| *v != T::default())
}

/// The region path segment of an on-demand check must be present
pub fn validate_region(region: &str) -> Result<&str, ValidationError> {
    let region = region.trim();
    if region.is_empty() {
        return Err(ValidationError::MissingRegion);
    }
    Ok(region)
}
