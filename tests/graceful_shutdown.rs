//! Termination while requests are in flight.

use std::time::{Duration, Instant};

use axum::{routing::get, Router};
use service_runner::config::ConfigOverrides;
use service_runner::lifecycle::DrainOutcome;
use service_runner::{AppRegistry, AppTarget, Phase};

mod common;

fn slow_app(delay: Duration) -> AppRegistry {
    let target: AppTarget = "tests.slow:app".parse().unwrap();
    AppRegistry::new().with(target, move || {
        Router::new().route(
            "/work",
            get(move || async move {
                tokio::time::sleep(delay).await;
                "finished"
            }),
        )
    })
}

fn overrides(grace_secs: u64) -> ConfigOverrides {
    ConfigOverrides {
        app: Some("tests.slow:app".parse().unwrap()),
        grace_period_secs: Some(grace_secs),
        ..common::loopback_overrides()
    }
}

async fn wait_until_busy(running: &common::Running) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while running.tracker.in_flight() == 0 {
        assert!(Instant::now() < deadline, "request never reached the handler");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn in_flight_request_completes_within_grace_period() {
    let mut running = common::spawn_supervisor(overrides(5), slow_app(Duration::from_millis(300)));
    running.reach(Phase::Serving).await;
    let addr = running.endpoint();

    let request = tokio::spawn(async move {
        common::client().get(format!("http://{addr}/work")).send().await
    });
    wait_until_busy(&running).await;

    running.terminate();
    assert_eq!(running.reach(Phase::ShuttingDown).await, Phase::ShuttingDown);

    let res = request.await.unwrap().expect("in-flight request dropped");
    assert_eq!(res.text().await.unwrap(), "finished");

    let lifecycle = running.lifecycle.clone();
    let report = running.finish().await.unwrap();
    assert_eq!(report.outcome, DrainOutcome::Drained);
    assert!(report.elapsed < Duration::from_secs(5));
    assert_eq!(lifecycle.current(), Phase::Terminated);
}

#[tokio::test]
async fn stuck_request_is_abandoned_at_deadline() {
    let mut running = common::spawn_supervisor(overrides(1), slow_app(Duration::from_secs(60)));
    running.reach(Phase::Serving).await;
    let addr = running.endpoint();

    let _request = tokio::spawn(async move {
        common::client().get(format!("http://{addr}/work")).send().await
    });
    wait_until_busy(&running).await;

    let started = Instant::now();
    running.terminate();

    let lifecycle = running.lifecycle.clone();
    let report = running.finish().await.expect("forced drain still terminates cleanly");

    assert_eq!(report.outcome, DrainOutcome::Abandoned { in_flight: 1 });
    assert!(report.elapsed >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(lifecycle.current(), Phase::Terminated);
    assert!(!lifecycle.history().contains(&Phase::Failed));
}

#[tokio::test]
async fn new_connections_refused_once_shutting_down() {
    let mut running = common::spawn_supervisor(overrides(5), slow_app(Duration::from_millis(500)));
    running.reach(Phase::Serving).await;
    let addr = running.endpoint();

    let _request = tokio::spawn(async move {
        common::client().get(format!("http://{addr}/work")).send().await
    });
    wait_until_busy(&running).await;

    running.terminate();
    running.reach(Phase::ShuttingDown).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let late = common::client()
        .get(format!("http://{addr}/work"))
        .timeout(Duration::from_secs(2))
        .send()
        .await;
    assert!(late.is_err(), "listener should stop accepting during drain");

    running.finish().await.unwrap();
}
