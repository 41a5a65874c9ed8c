//! Shared utilities for supervisor integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use service_runner::config::ConfigOverrides;
use service_runner::lifecycle::ShutdownReport;
use service_runner::http::InFlightTracker;
use service_runner::privilege::{Account, IdentityOps, PrivilegeError, ROOT_UID};
use service_runner::{AppRegistry, Lifecycle, Phase, StartupError, Supervisor};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const RUN_USER: &str = "appuser";
pub const RUN_UID: u32 = 1000;

/// In-memory host identity starting as root, with `root` and `appuser` accounts.
pub struct FakeIdentity {
    euid: AtomicU32,
    accounts: Vec<Account>,
}

impl FakeIdentity {
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            euid: AtomicU32::new(ROOT_UID),
            accounts: vec![
                Account { name: "root".into(), uid: ROOT_UID, gid: 0 },
                Account { name: RUN_USER.into(), uid: RUN_UID, gid: RUN_UID },
            ],
        })
    }

    pub fn uid(&self) -> u32 {
        self.euid.load(Ordering::SeqCst)
    }
}

impl IdentityOps for FakeIdentity {
    fn effective_uid(&self) -> u32 {
        self.uid()
    }

    fn lookup(&self, name: &str) -> Result<Option<Account>, PrivilegeError> {
        Ok(self.accounts.iter().find(|a| a.name == name).cloned())
    }

    fn assume(&self, account: &Account) -> Result<(), PrivilegeError> {
        self.euid.store(account.uid, Ordering::SeqCst);
        Ok(())
    }

    fn retains_root(&self) -> bool {
        self.uid() == ROOT_UID
    }
}

/// Overrides binding loopback on an ephemeral port.
pub fn loopback_overrides() -> ConfigOverrides {
    ConfigOverrides {
        bind_host: Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        bind_port: Some(0),
        ..Default::default()
    }
}

/// A supervisor running in the background.
pub struct Running {
    pub lifecycle: Lifecycle,
    pub tracker: InFlightTracker,
    pub identity: Arc<FakeIdentity>,
    stop: Option<oneshot::Sender<()>>,
    pub handle: JoinHandle<Result<ShutdownReport, StartupError>>,
}

impl Running {
    /// Deliver the termination request.
    pub fn terminate(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Wait for `phase` (or a terminal phase), failing the test after 5s.
    pub async fn reach(&self, phase: Phase) -> Phase {
        tokio::time::timeout(Duration::from_secs(5), self.lifecycle.wait_for(phase))
            .await
            .expect("lifecycle stalled")
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.lifecycle.endpoint().expect("listener was never bound")
    }

    /// Wait for the run to return.
    pub async fn finish(self) -> Result<ShutdownReport, StartupError> {
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("supervisor did not exit")
            .expect("supervisor task panicked")
    }
}

/// Start a supervisor with the fake identity and an empty environment.
pub fn spawn_supervisor(overrides: ConfigOverrides, registry: AppRegistry) -> Running {
    spawn_supervisor_with_env(overrides, registry, HashMap::new())
}

pub fn spawn_supervisor_with_env(
    overrides: ConfigOverrides,
    registry: AppRegistry,
    env: HashMap<String, String>,
) -> Running {
    let identity = FakeIdentity::root();
    let supervisor = Supervisor::new(overrides, registry)
        .with_identity(identity.clone())
        .without_logging();

    let lifecycle = supervisor.lifecycle();
    let tracker = supervisor.tracker();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        supervisor
            .run(&env, async move {
                let _ = stop_rx.await;
            })
            .await
    });

    Running {
        lifecycle,
        tracker,
        identity,
        stop: Some(stop_tx),
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
