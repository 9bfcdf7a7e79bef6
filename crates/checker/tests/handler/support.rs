//! Scripted probers and recording collaborators

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use checker::metrics::MetricsRecorder;
use checker::request::OtelConfig;
use checker::telemetry::{AnalyticsSink, StatusStore};
use checker::{
    Backoff, CheckEvent, CheckHandler, CheckResponse, ProbeError, ProbeResult, Prober, Protocol,
    RawCheckRequest, RegionRouter, StatusUpdate, TelemetryError,
};

/// Prober replaying a fixed script, then repeating its fallback
pub struct ScriptedProber {
    script: Mutex<VecDeque<Result<ProbeResult, ProbeError>>>,
    fallback: Result<ProbeResult, ProbeError>,
    calls: AtomicU32,
}

impl ScriptedProber {
    pub fn always(result: Result<ProbeResult, ProbeError>) -> Arc<Self> {
        Arc::new(Self { script: Mutex::new(VecDeque::new()), fallback: result, calls: AtomicU32::new(0) })
    }

    pub fn reachable(latency: i64) -> Arc<Self> {
        Self::always(Ok(ProbeResult::tcp(1_700_000_000_000, 1_700_000_000_000 + latency)))
    }

    pub fn unreachable() -> Arc<Self> {
        Self::always(Err(ProbeError::Connect("connection refused".to_string())))
    }

    pub fn sequence(
        script: Vec<Result<ProbeResult, ProbeError>>,
        fallback: Result<ProbeResult, ProbeError>,
    ) -> Arc<Self> {
        Arc::new(Self { script: Mutex::new(script.into()), fallback, calls: AtomicU32::new(0) })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, _timeout: Duration, _target: &str) -> Result<ProbeResult, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Records every event and status update; optionally fails every delivery
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<(String, CheckEvent)>>,
    pub updates: Mutex<Vec<StatusUpdate>>,
    pub exports: Mutex<Vec<(OtelConfig, String, CheckResponse)>>,
    pub fail: bool,
}

impl Recorder {
    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, ..Default::default() })
    }

    pub fn events(&self) -> Vec<(String, CheckEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn exports(&self) -> Vec<(OtelConfig, String, CheckResponse)> {
        self.exports.lock().unwrap().clone()
    }

    fn outcome(&self, target: &'static str) -> Result<(), TelemetryError> {
        if self.fail { Err(TelemetryError::Rejected { target, status: 503 }) } else { Ok(()) }
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for Recorder {
    async fn send_event(&self, stream: &str, event: &CheckEvent) -> Result<(), TelemetryError> {
        self.events.lock().unwrap().push((stream.to_string(), event.clone()));
        self.outcome("analytics sink")
    }
}

#[async_trait::async_trait]
impl StatusStore for Recorder {
    async fn update_status(&self, update: &StatusUpdate) -> Result<(), TelemetryError> {
        self.updates.lock().unwrap().push(update.clone());
        self.outcome("status store")
    }
}

#[async_trait::async_trait]
impl MetricsRecorder for Recorder {
    async fn record(
        &self,
        config: &OtelConfig,
        region: &str,
        _uri: &str,
        response: &CheckResponse,
    ) -> Result<(), TelemetryError> {
        self.exports.lock().unwrap().push((config.clone(), region.to_string(), response.clone()));
        self.outcome("metrics endpoint")
    }
}

/// Backoff with 1 ms delays so retries do not slow the suite down
pub fn fast_backoff() -> Backoff {
    Backoff::new(Duration::from_millis(1), Duration::from_millis(1)).with_randomization(0.0)
}

/// Handler bound to region `us` behind a forwarding proxy
pub fn handler_with(prober: Arc<ScriptedProber>, recorder: Arc<Recorder>) -> CheckHandler {
    CheckHandler::builder("us")
        .router(RegionRouter::new("us"))
        .backoff(fast_backoff())
        .prober(Protocol::Tcp, prober)
        .analytics(recorder.clone())
        .status_store(recorder.clone())
        .metrics(recorder)
        .build()
}

pub fn tcp_request() -> RawCheckRequest {
    RawCheckRequest {
        workspace_id: "1".to_string(),
        monitor_id: "42".to_string(),
        uri: "example.com:443".to_string(),
        timeout: 1_000,
        cron_timestamp: Some(1_700_000_000_000),
        ..Default::default()
    }
}
