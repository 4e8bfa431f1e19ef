//! Startup supervisor and readiness gate against a running system.

mod common;

use std::sync::Arc;
use std::time::Duration;

use autofulfill_core::clock::SystemClock;
use autofulfill_core::gateway::GatewayError;
use autofulfill_core::notification::Observers;
use autofulfill_core::orchestration::{AutofulfillSystem, SystemPhase};

use common::{fast_config, wait_for_status, RecordingSink, ScriptedProbeGateway};

fn not_ready(n: usize) -> Vec<Result<(), GatewayError>> {
    (0..n)
        .map(|i| Err(GatewayError::NotReady(format!("loading step {i}"))))
        .collect()
}

#[tokio::test]
async fn test_arms_exactly_once_after_three_not_ready_probes() {
    let mut config = fast_config();
    // No scheduled cycle may probe the gateway during this test.
    config.timing.initial_poll_delay_ms = 60_000;

    let gateway = Arc::new(ScriptedProbeGateway::new(not_ready(3)));
    let sink = RecordingSink::new("player");
    let observers = Arc::new(Observers::new());
    observers.register(sink.clone());

    let mut system = AutofulfillSystem::start(
        &config,
        gateway.clone(),
        observers,
        Arc::new(SystemClock),
    );

    let status = wait_for_status(system.main_loop(), Duration::from_secs(5), |s| {
        s.phase == SystemPhase::Ready
    })
    .await;

    assert_eq!(status.arm_count, 1);
    assert!(status.poller_armed);
    assert_eq!(status.live_schedules, 1);
    assert_eq!(gateway.probes(), 4, "ready on the fourth check");
    assert_eq!(sink.count_containing("Autofulfill system started"), 1);

    // Give the supervisor time to misbehave if it were going to.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(gateway.probes(), 4);
    assert!(system.startup_finished());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_extra_readiness_checks_do_not_rearm() {
    let mut config = fast_config();
    config.timing.initial_poll_delay_ms = 60_000;

    let mut system = AutofulfillSystem::start(
        &config,
        Arc::new(ScriptedProbeGateway::new(Vec::new())),
        Arc::new(Observers::new()),
        Arc::new(SystemClock),
    );
    wait_for_status(system.main_loop(), Duration::from_secs(5), |s| {
        s.phase == SystemPhase::Ready
    })
    .await;

    for _ in 0..3 {
        assert!(system.main_loop().check_readiness().await.unwrap().is_ready());
    }

    let status = system.main_loop().status().await.unwrap();
    assert_eq!(status.arm_count, 1);
    assert_eq!(status.schedule_generation, 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_malformed_surface_waits_for_error_backoff() {
    let mut config = fast_config();
    config.timing.initial_poll_delay_ms = 60_000;
    config.timing.readiness_retry_ms = 10;
    config.timing.readiness_error_retry_ms = 400;

    let gateway = Arc::new(ScriptedProbeGateway::new(vec![Err(
        GatewayError::ShapeMismatch("colony list is not a list".to_string()),
    )]));
    let mut system = AutofulfillSystem::start(
        &config,
        gateway.clone(),
        Arc::new(Observers::new()),
        Arc::new(SystemClock),
    );

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(gateway.probes(), 1, "second probe waits for the longer delay");
    assert_eq!(
        system.main_loop().status().await.unwrap().phase,
        SystemPhase::Waiting
    );

    let status = wait_for_status(system.main_loop(), Duration::from_secs(5), |s| {
        s.phase == SystemPhase::Ready
    })
    .await;
    assert_eq!(status.arm_count, 1);
    assert_eq!(gateway.probes(), 2);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_grace_period_delays_first_probe() {
    let mut config = fast_config();
    config.timing.initial_poll_delay_ms = 60_000;
    config.timing.startup_grace_ms = 300;

    let gateway = Arc::new(ScriptedProbeGateway::new(Vec::new()));
    let mut system = AutofulfillSystem::start(
        &config,
        gateway.clone(),
        Arc::new(Observers::new()),
        Arc::new(SystemClock),
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(gateway.probes(), 0);
    assert!(!system.main_loop().status().await.unwrap().poller_armed);

    wait_for_status(system.main_loop(), Duration::from_secs(5), |s| s.poller_armed).await;
    assert_eq!(gateway.probes(), 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_while_waiting_stops_supervisor() {
    let config = fast_config();
    let gateway = Arc::new(ScriptedProbeGateway::new(not_ready(10_000)));

    let mut system = AutofulfillSystem::start(
        &config,
        gateway.clone(),
        Arc::new(Observers::new()),
        Arc::new(SystemClock),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    system.shutdown().await.unwrap();

    let probes = gateway.probes();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(gateway.probes(), probes);
    assert!(!system.is_running());
}
