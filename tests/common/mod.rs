//! Shared utilities for integration tests.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;

use instance_health::config::ProbeConfig;
use instance_health::health::{FixedParallelism, HealthChecker};
use instance_health::probe::{
    HttpProbe, Interrupted, ProbeContext, ProbeError, ProbeExecutor, ProbeVerdict,
};
use instance_health::resolver::{EnvMap, InstanceResolver, MemoryResolver, ResolveError};

/// Start a `/health` endpoint whose status comes from `handler`.
/// Returns the bound port.
#[allow(dead_code)]
pub async fn start_health_server<F, Fut>(handler: F) -> u16
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = StatusCode> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let app = Router::new().route("/health", get(move || handler()));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    port
}

/// Start a `/health` endpoint that always answers `status`.
#[allow(dead_code)]
pub async fn start_fixed_server(status: StatusCode) -> u16 {
    start_health_server(move || async move { status }).await
}

/// A port with nothing listening on it.
#[allow(dead_code)]
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Probe settings pointed at the loopback address.
#[allow(dead_code)]
pub fn loopback_probe() -> ProbeConfig {
    ProbeConfig {
        host: "127.0.0.1".to_string(),
        ..ProbeConfig::default()
    }
}

/// Resolver with each `(instance, port)` registered under `HEALTH_CHECK_PORT`.
#[allow(dead_code)]
pub fn resolver_with_ports(instances: &[(&str, u16)]) -> Arc<MemoryResolver> {
    let resolver = MemoryResolver::new();
    for (name, port) in instances {
        resolver.insert(*name, [("HEALTH_CHECK_PORT", port.to_string())]);
    }
    Arc::new(resolver)
}

/// Checker using the real HTTP probe against loopback servers.
#[allow(dead_code)]
pub fn http_checker(resolver: Arc<dyn InstanceResolver>) -> HealthChecker {
    HealthChecker::new(resolver, Arc::new(HttpProbe::default()), loopback_probe())
        .with_parallelism(Arc::new(FixedParallelism::new(4)))
}

/// Resolver whose existence lookup always errors.
#[allow(dead_code)]
pub struct BrokenLookup;

#[async_trait]
impl InstanceResolver for BrokenLookup {
    async fn exists(&self, _ctx: &ProbeContext, instance: &str) -> Result<bool, ResolveError> {
        Err(ResolveError::Lookup {
            instance: instance.to_string(),
            reason: "registry unavailable".to_string(),
        })
    }

    async fn working_directory(&self, instance: &str) -> Result<PathBuf, ResolveError> {
        Err(ResolveError::UnknownInstance(instance.to_string()))
    }

    async fn read_config(&self, dir: &Path) -> Result<EnvMap, ResolveError> {
        Err(ResolveError::UnknownInstance(dir.display().to_string()))
    }
}

/// Resolver whose existence lookup takes the given time, then finds nothing.
#[allow(dead_code)]
pub struct SlowLookup(pub Duration);

#[async_trait]
impl InstanceResolver for SlowLookup {
    async fn exists(&self, _ctx: &ProbeContext, _instance: &str) -> Result<bool, ResolveError> {
        tokio::time::sleep(self.0).await;
        Ok(false)
    }

    async fn working_directory(&self, instance: &str) -> Result<PathBuf, ResolveError> {
        Err(ResolveError::UnknownInstance(instance.to_string()))
    }

    async fn read_config(&self, dir: &Path) -> Result<EnvMap, ResolveError> {
        Err(ResolveError::UnknownInstance(dir.display().to_string()))
    }
}

/// Probe executor that answers healthy at once, except for one port
/// where it panics.
#[allow(dead_code)]
pub struct PanicsOnPort(pub u16);

#[async_trait]
impl ProbeExecutor for PanicsOnPort {
    async fn fetch(&self, _ctx: &ProbeContext, url: &str) -> Result<ProbeVerdict, ProbeError> {
        if port_of(url) == self.0 {
            panic!("probe executor crashed on {url}");
        }
        Ok(ProbeVerdict::Healthy)
    }
}

type DelayFn = dyn Fn(u16) -> Duration + Send + Sync;

/// Probe executor that never touches the network: it sleeps for a
/// per-port delay and answers healthy, while counting how many probes
/// are executing at once.
#[allow(dead_code)]
pub struct ScriptedProbe {
    delay: Box<DelayFn>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    finished: Mutex<Vec<u16>>,
}

#[allow(dead_code)]
impl ScriptedProbe {
    pub fn new(delay: impl Fn(u16) -> Duration + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            delay: Box::new(delay),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            finished: Mutex::new(Vec::new()),
        })
    }

    /// Highest number of probes observed executing simultaneously.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Ports in the order their probes completed.
    pub fn completion_order(&self) -> Vec<u16> {
        self.finished.lock().unwrap().clone()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProbeExecutor for ScriptedProbe {
    async fn fetch(&self, ctx: &ProbeContext, url: &str) -> Result<ProbeVerdict, ProbeError> {
        let port = port_of(url);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak.fetch_max(now, Ordering::SeqCst);

        match ctx.run(tokio::time::sleep((self.delay)(port))).await {
            Ok(()) => {
                self.finished.lock().unwrap().push(port);
                Ok(ProbeVerdict::Healthy)
            }
            Err(Interrupted::Cancelled) => Err(ProbeError::Cancelled),
            Err(Interrupted::DeadlineExceeded) => Err(ProbeError::Transport {
                url: url.to_string(),
                reason: "deadline exceeded".to_string(),
            }),
        }
    }
}

fn port_of(url: &str) -> u16 {
    url.trim_start_matches("http://")
        .split('/')
        .next()
        .and_then(|authority| authority.rsplit(':').next())
        .and_then(|port| port.parse().ok())
        .unwrap_or(0)
}

/// Checker wired to a scripted probe with pinned parallelism.
#[allow(dead_code)]
pub fn scripted_checker(
    instances: &[(&str, u16)],
    probe: Arc<ScriptedProbe>,
    parallelism: usize,
) -> HealthChecker {
    HealthChecker::new(resolver_with_ports(instances), probe, loopback_probe())
        .with_parallelism(Arc::new(FixedParallelism::new(parallelism)))
}
