//! End-to-end startup and clean shutdown through the supervisor.

use std::collections::HashMap;

use axum::http::StatusCode;
use service_runner::config::UNBUFFERED_ENV;
use service_runner::lifecycle::DrainOutcome;
use service_runner::{AppRegistry, Phase};

mod common;

#[tokio::test]
async fn serves_after_ordered_startup() {
    let mut running = common::spawn_supervisor(common::loopback_overrides(), AppRegistry::builtin());

    assert_eq!(running.reach(Phase::Serving).await, Phase::Serving);
    assert_eq!(
        running.lifecycle.history(),
        vec![
            Phase::Init,
            Phase::Configuring,
            Phase::PrivilegeDropped,
            Phase::Bound,
            Phase::Serving,
        ]
    );
    assert_eq!(running.identity.uid(), common::RUN_UID);
    assert!(!running.handle.is_finished(), "still running while serving");

    let addr = running.endpoint();
    let client = common::client();

    let res = client.get(format!("http://{addr}/")).send().await.expect("service unreachable");
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Service is running");

    let res = client.get(format!("http://{addr}/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    running.terminate();
    let lifecycle = running.lifecycle.clone();
    let report = running.finish().await.expect("clean shutdown");

    assert_eq!(report.outcome, DrainOutcome::Drained);
    assert_eq!(lifecycle.current(), Phase::Terminated);
    assert_eq!(
        lifecycle.history()[5..],
        [Phase::ShuttingDown, Phase::Terminated]
    );
}

#[tokio::test]
async fn port_released_after_shutdown() {
    let mut running = common::spawn_supervisor(common::loopback_overrides(), AppRegistry::builtin());
    running.reach(Phase::Serving).await;
    let addr = running.endpoint();

    running.terminate();
    running.finish().await.unwrap();

    let rebound = tokio::net::TcpListener::bind(addr).await;
    assert!(rebound.is_ok(), "port {addr} should be free after exit");
}

#[tokio::test]
async fn buffering_flag_does_not_affect_startup() {
    for value in ["", "1", "0", "garbage"] {
        let env = HashMap::from([(UNBUFFERED_ENV.to_string(), value.to_string())]);
        let mut running = common::spawn_supervisor_with_env(
            common::loopback_overrides(),
            AppRegistry::builtin(),
            env,
        );

        assert_eq!(running.reach(Phase::Serving).await, Phase::Serving, "flag {value:?}");
        running.terminate();
        assert!(running.finish().await.is_ok(), "flag {value:?}");
    }
}
