//! Single-instance health pipeline.
//!
//! # Stages
//! ```text
//! exists? → working directory → env file → port → GET → verdict
//! ```
//! Every stage short-circuits into `HealthStatus::unknown` with its cause.
//! The lookup stages race the caller's `ProbeContext`; the HTTP call is
//! bounded by the executor itself, so a timeout there stays a transport
//! failure.

use std::time::Instant;

use crate::health::status::{HealthError, HealthStatus, ProbeTarget};
use crate::health::Inner;
use crate::observability::metrics;
use crate::probe::{Interrupted, ProbeContext, ProbeError, ProbeVerdict};
use crate::resolver::EnvMap;

impl Inner {
    /// Run every stage for `instance`. Never fails; errors land in the status.
    pub(crate) async fn check(&self, ctx: &ProbeContext, instance: &str) -> HealthStatus {
        let started = Instant::now();

        let status = match self.stages(ctx, instance).await {
            Ok(verdict) => HealthStatus::from_verdict(instance, verdict),
            Err(error) => {
                tracing::debug!(%instance, %error, "health check inconclusive");
                HealthStatus::unknown(instance, error)
            }
        };

        metrics::record_check(status.state(), started.elapsed());
        status
    }

    async fn stages(&self, ctx: &ProbeContext, instance: &str) -> Result<ProbeVerdict, HealthError> {
        let target = match ctx.run(self.resolve_target(ctx, instance)).await {
            Ok(target) => target?,
            Err(Interrupted::Cancelled) => return Err(HealthError::Cancelled),
            Err(Interrupted::DeadlineExceeded) => {
                return Err(HealthError::DeadlineExceeded {
                    timeout: self.probe.timeout(),
                })
            }
        };
        let url = target.url(&self.probe.host, &self.probe.path);

        self.executor.fetch(ctx, &url).await.map_err(|e| match e {
            ProbeError::Cancelled => HealthError::Cancelled,
            other => HealthError::Probe(other),
        })
    }

    async fn resolve_target(
        &self,
        ctx: &ProbeContext,
        instance: &str,
    ) -> Result<ProbeTarget, HealthError> {
        if instance.is_empty() {
            return Err(HealthError::NotFound);
        }

        let exists = self
            .resolver
            .exists(ctx, instance)
            .await
            .map_err(HealthError::Lookup)?;
        if !exists {
            return Err(HealthError::NotFound);
        }

        let dir = self
            .resolver
            .working_directory(instance)
            .await
            .map_err(HealthError::Config)?;
        let env = self
            .resolver
            .read_config(&dir)
            .await
            .map_err(HealthError::Config)?;

        Ok(ProbeTarget {
            instance: instance.to_string(),
            port: extract_port(&env, &self.probe.port_key)?,
        })
    }
}

/// Read and parse the health port from an instance's env map.
pub(crate) fn extract_port(env: &EnvMap, key: &str) -> Result<u16, HealthError> {
    let raw = env.get(key).ok_or_else(|| HealthError::MissingPort {
        key: key.to_string(),
    })?;

    raw.trim()
        .parse::<u16>()
        .map_err(|source| HealthError::InvalidPort {
            key: key.to_string(),
            value: raw.clone(),
            source,
        })
}
