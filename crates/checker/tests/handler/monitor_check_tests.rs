//! Scheduled monitor check tests

use std::sync::Arc;

use checker::{
    CheckOutcome, MonitorStatus, ProbeError, ProbeResult, Protocol, RawCheckRequest, Trigger,
    ValidationError,
};

use super::support::{Recorder, ScriptedProber, handler_with, tcp_request};

#[tokio::test]
async fn test_recovery_to_active() {
    let prober = ScriptedProber::reachable(50);
    let recorder = Arc::new(Recorder::default());
    let handler = handler_with(prober.clone(), recorder.clone());

    let raw = RawCheckRequest {
        degraded_after: Some(100),
        status: Some("degraded".to_string()),
        ..tcp_request()
    };
    let outcome = handler.check(Protocol::Tcp, None, raw, false).await.unwrap();

    assert_eq!(outcome, CheckOutcome::Completed { status: MonitorStatus::Active, response: None });
    assert_eq!(prober.calls(), 1);

    let updates = recorder.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].status, MonitorStatus::Active);
    assert_eq!(updates[0].monitor_id, "42");
    assert_eq!(updates[0].region, "us");
    assert_eq!(updates[0].latency, Some(50));
    assert_eq!(updates[0].cron_timestamp, Some(1_700_000_000_000));

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    let (stream, event) = &events[0];
    assert_eq!(stream, "tcp_response__v0");
    assert_eq!(event.request_status, Some(MonitorStatus::Active));
    assert_eq!(event.latency, Some(50));
    assert_eq!(event.error, 0);
}

#[tokio::test]
async fn test_still_degraded_skips_status_update() {
    let recorder = Arc::new(Recorder::default());
    let handler = handler_with(ScriptedProber::reachable(150), recorder.clone());

    let raw = RawCheckRequest {
        degraded_after: Some(100),
        status: Some("degraded".to_string()),
        ..tcp_request()
    };
    let outcome = handler.check(Protocol::Tcp, None, raw, false).await.unwrap();

    assert_eq!(outcome, CheckOutcome::Completed { status: MonitorStatus::Degraded, response: None });
    assert!(recorder.updates().is_empty());

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].1.latency, Some(150));
    assert_eq!(events[0].1.request_status, Some(MonitorStatus::Degraded));
}

#[tokio::test]
async fn test_latency_at_threshold_is_degraded() {
    let recorder = Arc::new(Recorder::default());
    let handler = handler_with(ScriptedProber::reachable(100), recorder.clone());

    let raw = RawCheckRequest {
        degraded_after: Some(100),
        status: Some("active".to_string()),
        ..tcp_request()
    };
    handler.check(Protocol::Tcp, None, raw, false).await.unwrap();

    let updates = recorder.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].status, MonitorStatus::Degraded);
}

#[tokio::test]
async fn test_active_without_threshold_is_noop() {
    let recorder = Arc::new(Recorder::default());
    let handler = handler_with(ScriptedProber::reachable(5_000), recorder.clone());

    let raw = RawCheckRequest { status: Some("active".to_string()), ..tcp_request() };
    let outcome = handler.check(Protocol::Tcp, None, raw, false).await.unwrap();

    assert_eq!(outcome, CheckOutcome::Completed { status: MonitorStatus::Active, response: None });
    assert!(recorder.updates().is_empty());
    assert_eq!(recorder.events().len(), 1);
}

#[tokio::test]
async fn test_unreachable_target_exhausts_budget() {
    let prober = ScriptedProber::unreachable();
    let recorder = Arc::new(Recorder::default());
    let handler = handler_with(prober.clone(), recorder.clone());

    let raw = RawCheckRequest { retry: Some(3), status: Some("error".to_string()), ..tcp_request() };
    let outcome = handler.check(Protocol::Tcp, None, raw, true).await.unwrap();

    assert_eq!(outcome, CheckOutcome::Completed { status: MonitorStatus::Error, response: None });
    assert_eq!(prober.calls(), 3);

    // Error is re-asserted even though the monitor was already down.
    let updates = recorder.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].status, MonitorStatus::Error);
    assert!(updates[0].message.as_deref().unwrap().contains("connection refused"));
    assert_eq!(updates[0].latency, None);

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    let event = &events[0].1;
    assert!(event.is_error());
    assert_eq!(event.latency, None);
    assert_eq!(event.request_status, Some(MonitorStatus::Error));
    assert_eq!(event.monitor_id, Some(42));
    assert_eq!(event.workspace_id, Some(1));
}

#[tokio::test]
async fn test_zero_retry_uses_default_budget() {
    for retry in [None, Some(0)] {
        let prober = ScriptedProber::unreachable();
        let handler = handler_with(prober.clone(), Arc::new(Recorder::default()));

        let raw = RawCheckRequest { retry, ..tcp_request() };
        handler.check(Protocol::Tcp, None, raw, false).await.unwrap();

        assert_eq!(prober.calls(), 3, "retry {retry:?}");
    }
}

#[tokio::test]
async fn test_explicit_retry_is_honored() {
    for retry in [1, 2, 5] {
        let prober = ScriptedProber::unreachable();
        let handler = handler_with(prober.clone(), Arc::new(Recorder::default()));

        let raw = RawCheckRequest { retry: Some(retry), ..tcp_request() };
        handler.check(Protocol::Tcp, None, raw, false).await.unwrap();

        assert_eq!(prober.calls(), retry);
    }
}

#[tokio::test]
async fn test_success_after_transient_failures() {
    let prober = ScriptedProber::sequence(
        vec![Err(ProbeError::Timeout(1_000)), Err(ProbeError::Connect("reset".to_string()))],
        Ok(ProbeResult::tcp(10, 30)),
    );
    let recorder = Arc::new(Recorder::default());
    let handler = handler_with(prober.clone(), recorder.clone());

    let outcome = handler.check(Protocol::Tcp, None, tcp_request(), true).await.unwrap();

    assert_eq!(prober.calls(), 3);
    let CheckOutcome::Completed { status, response: Some(response) } = outcome else {
        panic!("expected a detailed completed check, got {outcome:?}");
    };
    assert_eq!(status, MonitorStatus::Active);
    assert_eq!(response.latency, 20);
    assert_eq!(response.region, "us");
    assert_eq!(response.job_type, Protocol::Tcp);

    // Only the successful attempt produced an event.
    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert!(!events[0].1.is_error());
}

#[tokio::test]
async fn test_region_mismatch_forwards_without_probing() {
    let prober = ScriptedProber::reachable(10);
    let recorder = Arc::new(Recorder::default());
    let handler = handler_with(prober.clone(), recorder.clone());

    let outcome = handler.check(Protocol::Tcp, Some("eu"), tcp_request(), true).await.unwrap();

    assert_eq!(outcome, CheckOutcome::Forward { region: "eu".to_string() });
    assert_eq!(prober.calls(), 0);
    assert!(recorder.events().is_empty());
    assert!(recorder.updates().is_empty());
}

#[tokio::test]
async fn test_matching_region_proceeds() {
    let prober = ScriptedProber::reachable(10);
    let handler = handler_with(prober.clone(), Arc::new(Recorder::default()));

    let outcome = handler.check(Protocol::Tcp, Some("us"), tcp_request(), false).await.unwrap();

    assert!(matches!(outcome, CheckOutcome::Completed { .. }));
    assert_eq!(prober.calls(), 1);
}

#[tokio::test]
async fn test_malformed_ids_emit_nothing() {
    let cases = [
        RawCheckRequest { workspace_id: "ws_1".to_string(), ..tcp_request() },
        RawCheckRequest { monitor_id: "".to_string(), ..tcp_request() },
        RawCheckRequest { monitor_id: "4.2".to_string(), ..tcp_request() },
    ];

    for raw in cases {
        let prober = ScriptedProber::reachable(10);
        let recorder = Arc::new(Recorder::default());
        let handler = handler_with(prober.clone(), recorder.clone());

        let result = handler.check(Protocol::Tcp, None, raw, true).await;

        assert!(matches!(
            result,
            Err(ValidationError::WorkspaceId(_)) | Err(ValidationError::MonitorId(_))
        ));
        assert_eq!(prober.calls(), 0);
        assert!(recorder.events().is_empty());
        assert!(recorder.updates().is_empty());
    }
}

#[tokio::test]
async fn test_trigger_defaults_to_cron() {
    let recorder = Arc::new(Recorder::default());
    let handler = handler_with(ScriptedProber::reachable(10), recorder.clone());

    handler.check(Protocol::Tcp, None, tcp_request(), false).await.unwrap();
    let raw = RawCheckRequest { trigger: Some("api".to_string()), request_id: Some(77), ..tcp_request() };
    handler.check(Protocol::Tcp, None, raw, false).await.unwrap();

    let events = recorder.events();
    assert_eq!(events[0].1.trigger, Trigger::Cron);
    assert_eq!(events[0].1.request_id, None);
    assert_eq!(events[1].1.trigger, Trigger::Api);
    assert_eq!(events[1].1.request_id, Some(77));
    assert_ne!(events[0].1.id, events[1].1.id);
}

#[tokio::test]
async fn test_telemetry_failures_do_not_fail_the_check() {
    let recorder = Recorder::failing();
    let handler = handler_with(ScriptedProber::unreachable(), recorder.clone());

    let outcome = handler.check(Protocol::Tcp, None, tcp_request(), false).await;

    assert_eq!(outcome, Ok(CheckOutcome::Completed { status: MonitorStatus::Error, response: None }));
    assert_eq!(recorder.events().len(), 1);
    assert_eq!(recorder.updates().len(), 1);
}
