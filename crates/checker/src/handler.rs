//! Composition root: validation, routing, probing, status and telemetry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::DEFAULT_ATTEMPTS;
use crate::backoff::{Backoff, resolve_attempts};
use crate::config::CheckerConfig;
use crate::metrics::{HttpMetricsExporter, MetricsRecorder};
use crate::probe::{HttpProber, ProbeError, ProbeResult, Prober, Protocol, TcpProber};
use crate::region::{RegionRouter, RouteDecision};
use crate::request::{
    CheckRequest, OnDemandRequest, RawCheckRequest, Trigger, ValidationError, validate_region,
};
use crate::response::{CheckResponse, UnreachableMessage};
use crate::status::{MonitorStatus, StatusDecision};
use crate::telemetry::{
    AnalyticsSink, CheckEvent, EventsApiSink, HttpStatusStore, StatusStore, StatusUpdate,
    TelemetryEmitter, TracingSink, TracingStatusStore,
};

/// Result of a scheduled monitor check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The request belongs to another region; nothing was probed
    Forward { region: String },
    /// The check ran. `response` is only filled when detail was requested
    /// and the target answered.
    Completed { status: MonitorStatus, response: Option<CheckResponse> },
}

/// Result of an on-demand region check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnDemandOutcome {
    Forward { region: String },
    Reachable(CheckResponse),
    Unreachable(UnreachableMessage),
}

/// Drives one check request through the whole pipeline
pub struct CheckHandler {
    region: String,
    router: RegionRouter,
    backoff: Backoff,
    probers: HashMap<Protocol, Arc<dyn Prober>>,
    emitter: TelemetryEmitter,
    metrics: Option<Arc<dyn MetricsRecorder>>,
}

impl CheckHandler {
    pub fn builder(region: impl Into<String>) -> CheckHandlerBuilder {
        CheckHandlerBuilder::new(region)
    }

    /// Wire real collaborators from configuration
    pub fn from_config(config: &CheckerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.http.user_agent.as_str())
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build telemetry client")?;

        let sink: Arc<dyn AnalyticsSink> = match &config.analytics.endpoint {
            Some(endpoint) => Arc::new(
                EventsApiSink::new(client.clone(), endpoint, config.analytics.token.clone())
                    .context("invalid analytics endpoint")?,
            ),
            None => Arc::new(TracingSink),
        };

        let store: Arc<dyn StatusStore> = match &config.status_store.endpoint {
            Some(endpoint) => Arc::new(
                HttpStatusStore::new(client.clone(), endpoint, config.status_store.secret.clone())
                    .context("invalid status store endpoint")?,
            ),
            None => Arc::new(TracingStatusStore),
        };

        let http_prober = HttpProber::new(&config.http.user_agent)
            .map_err(|e| anyhow::anyhow!("failed to build HTTP prober: {e}"))?;

        Ok(Self::builder(config.region.name.clone())
            .router(config.router())
            .backoff(config.backoff())
            .prober(Protocol::Tcp, Arc::new(TcpProber::new()))
            .prober(Protocol::Http, Arc::new(http_prober))
            .analytics(sink)
            .status_store(store)
            .metrics(Arc::new(HttpMetricsExporter::new(client)))
            .build())
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Run a scheduled monitor check.
    ///
    /// Only a malformed request is an error. A target that stays down is a
    /// completed check with status `error`.
    pub async fn check(
        &self,
        protocol: Protocol,
        preferred_region: Option<&str>,
        raw: RawCheckRequest,
        detailed: bool,
    ) -> Result<CheckOutcome, ValidationError> {
        if let RouteDecision::Forward { region } = self.router.route(preferred_region) {
            info!(%region, bound = %self.region, "forwarding check to preferred region");
            return Ok(CheckOutcome::Forward { region });
        }

        let request = CheckRequest::try_from(raw)?;
        let attempts = resolve_attempts(request.retry);
        let prober = self.prober(protocol);

        let outcome = self
            .backoff
            .retry(attempts, |attempt| {
                probe_once(prober, request.timeout, &request.target, attempt)
            })
            .await;

        match outcome {
            Ok(probe) => Ok(self.record_success(protocol, &request, &probe, detailed).await),
            Err(exhausted) => {
                let message = format!("unable to check {protocol}: {}", exhausted.last);
                self.record_failure(protocol, &request, message).await;
                Ok(CheckOutcome::Completed { status: MonitorStatus::Error, response: None })
            }
        }
    }

    /// Run an on-demand check pinned to `region`.
    ///
    /// Always three attempts, never touches the status store, and only emits
    /// an event when the caller supplied a request id.
    pub async fn check_on_demand(
        &self,
        protocol: Protocol,
        region: &str,
        preferred_region: Option<&str>,
        raw: RawCheckRequest,
    ) -> Result<OnDemandOutcome, ValidationError> {
        let region = validate_region(region)?;

        if let RouteDecision::Forward { region } = self.router.route(preferred_region) {
            info!(%region, bound = %self.region, "forwarding on-demand check to preferred region");
            return Ok(OnDemandOutcome::Forward { region });
        }

        let request = OnDemandRequest::try_from(raw)?;
        let prober = self.prober(protocol);

        let outcome = self
            .backoff
            .retry(DEFAULT_ATTEMPTS, |attempt| {
                probe_once(prober, request.timeout, &request.target, attempt)
            })
            .await;

        let probe = match outcome {
            Ok(probe) => probe,
            Err(exhausted) => {
                warn!(target = %request.target, error = %exhausted.last, "on-demand target not reachable");
                return Ok(OnDemandOutcome::Unreachable(UnreachableMessage::default()));
            }
        };

        let response = CheckResponse::from_probe(&probe, &self.region, protocol);

        if request.request_id.is_some() {
            let event = CheckEvent::measurement(&probe, &self.region, Trigger::Api, &request.target)
                .with_request_id(request.request_id)
                .with_cron_timestamp(request.cron_timestamp);
            self.emitter.emit(protocol.on_demand_stream(), &event).await;
        }

        if let (Some(otel), Some(recorder)) = (&request.otel, &self.metrics) {
            if let Err(e) = recorder.record(otel, region, &request.target, &response).await {
                warn!(endpoint = %otel.endpoint, error = %e, "failed to export check metrics");
            }
        }

        Ok(OnDemandOutcome::Reachable(response))
    }

    fn prober(&self, protocol: Protocol) -> &dyn Prober {
        // The builder registers every protocol, so the fallback is unreachable.
        match self.probers.get(&protocol) {
            Some(prober) => prober.as_ref(),
            None => &TcpProber,
        }
    }

    async fn record_success(
        &self,
        protocol: Protocol,
        request: &CheckRequest,
        probe: &ProbeResult,
        detailed: bool,
    ) -> CheckOutcome {
        let latency = probe.latency();
        let decision =
            StatusDecision::from_latency(latency, request.degraded_after, request.previous_status);

        let event = CheckEvent::measurement(probe, &self.region, request.trigger, &request.target)
            .for_monitor(request.workspace_id, request.monitor_id)
            .with_request_id(request.request_id)
            .with_cron_timestamp(request.cron_timestamp)
            .with_status(decision.status);

        if decision.transition {
            let update = StatusUpdate {
                monitor_id: request.monitor_id.to_string(),
                status: decision.status,
                region: self.region.clone(),
                message: None,
                latency: Some(latency),
                cron_timestamp: request.cron_timestamp,
            };
            self.emitter.update_status(&update).await;
        }

        self.emitter.emit(protocol.monitor_stream(), &event).await;

        info!(
            monitor_id = request.monitor_id,
            latency,
            status = %decision.status,
            transition = decision.transition,
            "check completed"
        );

        CheckOutcome::Completed {
            status: decision.status,
            response: detailed.then(|| CheckResponse::from_probe(probe, &self.region, protocol)),
        }
    }

    async fn record_failure(&self, protocol: Protocol, request: &CheckRequest, message: String) {
        let decision = StatusDecision::exhausted();

        let event = CheckEvent::failure(message.as_str(), &self.region, request.trigger, &request.target)
            .for_monitor(request.workspace_id, request.monitor_id)
            .with_request_id(request.request_id)
            .with_cron_timestamp(request.cron_timestamp)
            .with_status(decision.status);
        self.emitter.emit(protocol.monitor_stream(), &event).await;

        let update = StatusUpdate {
            monitor_id: request.monitor_id.to_string(),
            status: decision.status,
            region: self.region.clone(),
            message: Some(message),
            latency: None,
            cron_timestamp: request.cron_timestamp,
        };
        self.emitter.update_status(&update).await;

        warn!(monitor_id = request.monitor_id, target = %request.target, "check failed on every attempt");
    }
}

async fn probe_once(
    prober: &dyn Prober,
    timeout: Duration,
    target: &str,
    attempt: u32,
) -> Result<ProbeResult, ProbeError> {
    let result = prober.probe(timeout, target).await;
    if let Err(error) = &result {
        debug!(attempt, target, %error, "probe attempt failed");
    }
    result
}

/// Builder for [`CheckHandler`]
pub struct CheckHandlerBuilder {
    region: String,
    router: Option<RegionRouter>,
    backoff: Backoff,
    probers: HashMap<Protocol, Arc<dyn Prober>>,
    sink: Arc<dyn AnalyticsSink>,
    store: Arc<dyn StatusStore>,
    metrics: Option<Arc<dyn MetricsRecorder>>,
}

impl CheckHandlerBuilder {
    fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            router: None,
            backoff: Backoff::default(),
            probers: HashMap::new(),
            sink: Arc::new(TracingSink),
            store: Arc::new(TracingStatusStore),
            metrics: None,
        }
    }

    /// Set the region router; defaults to one that never forwards
    pub fn router(mut self, router: RegionRouter) -> Self {
        self.router = Some(router);
        self
    }

    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn prober(mut self, protocol: Protocol, prober: Arc<dyn Prober>) -> Self {
        self.probers.insert(protocol, prober);
        self
    }

    pub fn analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn status_store(mut self, store: Arc<dyn StatusStore>) -> Self {
        self.store = store;
        self
    }

    pub fn metrics(mut self, recorder: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = Some(recorder);
        self
    }

    pub fn build(mut self) -> CheckHandler {
        self.probers.entry(Protocol::Tcp).or_insert_with(|| Arc::new(TcpProber::new()));
        self.probers
            .entry(Protocol::Http)
            .or_insert_with(|| Arc::new(HttpProber::with_client(reqwest::Client::new())));

        let router = self.router.unwrap_or_else(|| RegionRouter::disabled(self.region.clone()));

        CheckHandler {
            region: self.region,
            router,
            backoff: self.backoff,
            probers: self.probers,
            emitter: TelemetryEmitter::new(self.sink, self.store),
            metrics: self.metrics,
        }
    }
}
