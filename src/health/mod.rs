//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! get_status(ctx, id):
//!     child ctx (per-check deadline)
//!     → pipeline.rs (exists → config → port → probe → verdict)
//!     → HealthStatus
//!
//! get_status_batch(ctx, ids):
//!     fanout.rs (bounded worker pool, k = concurrency_cap(n, cpus))
//!     → pipeline.rs per instance
//!     → Vec<HealthStatus>, same order as ids
//! ```
//!
//! # Design Decisions
//! - Nothing here returns `Err`; every failure is an `Unknown` status with a cause
//! - Resolver, probe executor and parallelism are injected at construction
//! - One attempt per instance per call, no retries

pub mod fanout;
pub mod parallelism;
pub mod pipeline;
pub mod status;

use std::sync::Arc;

use crate::config::{HealthConfig, ProbeConfig};
use crate::probe::{HttpProbe, ProbeContext, ProbeExecutor};
use crate::resolver::{InstanceResolver, SystemdResolver};

pub use fanout::concurrency_cap;
pub use parallelism::{FixedParallelism, Parallelism, SystemParallelism};
pub use status::{HealthError, HealthState, HealthStatus, ProbeTarget};

/// Shared state behind a [`HealthChecker`]; cloned into batch workers.
#[derive(Clone)]
pub(crate) struct Inner {
    pub(crate) resolver: Arc<dyn InstanceResolver>,
    pub(crate) executor: Arc<dyn ProbeExecutor>,
    pub(crate) parallelism: Arc<dyn Parallelism>,
    pub(crate) probe: ProbeConfig,
}

/// Checks the health of named instances, one at a time or in batches.
#[derive(Clone)]
pub struct HealthChecker {
    inner: Arc<Inner>,
}

impl HealthChecker {
    /// Create a checker from its collaborators. Parallelism defaults to the
    /// live CPU count.
    pub fn new(
        resolver: Arc<dyn InstanceResolver>,
        executor: Arc<dyn ProbeExecutor>,
        probe: ProbeConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                resolver,
                executor,
                parallelism: Arc::new(SystemParallelism),
                probe,
            }),
        }
    }

    /// Production wiring: systemd resolver plus the hyper probe.
    pub fn from_config(config: &HealthConfig) -> Self {
        Self::new(
            Arc::new(SystemdResolver::new(config.resolver.clone())),
            Arc::new(HttpProbe::new(config.probe.user_agent.clone())),
            config.probe.clone(),
        )
    }

    /// Replace the parallelism provider used to size batch pools.
    pub fn with_parallelism(self, parallelism: Arc<dyn Parallelism>) -> Self {
        let mut inner = Inner::clone(&self.inner);
        inner.parallelism = parallelism;
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Concurrency cap a batch of `instances` would run with.
    pub fn batch_concurrency(&self, instances: usize) -> usize {
        concurrency_cap(instances, self.inner.parallelism.available().get())
    }

    /// Check one instance. The check is bounded by the configured per-check
    /// timeout (2s by default) or `ctx`'s own deadline, whichever is earlier.
    pub async fn get_status(&self, ctx: &ProbeContext, instance: &str) -> HealthStatus {
        let ctx = ctx.child_with_timeout(self.inner.probe.timeout());
        self.inner.check(&ctx, instance).await
    }

    /// Check many instances concurrently. The result has one slot per input,
    /// in input order.
    pub async fn get_status_batch<S>(&self, ctx: &ProbeContext, instances: &[S]) -> Vec<HealthStatus>
    where
        S: AsRef<str>,
    {
        let instances = instances.iter().map(|s| s.as_ref().to_string()).collect();
        self.inner.check_all(ctx, instances).await
    }
}
