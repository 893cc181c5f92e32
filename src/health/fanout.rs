//! Bounded fan-out across many instances.
//!
//! # Data Flow
//! ```text
//! instances[0..n]
//!     → bounded job queue (capacity k, dispatch waits when full)
//!     → k workers, each: child ctx (per-check deadline) → pipeline
//!     → (index, status) pairs sent back as each check finishes
//!     → Vec<HealthStatus> in input order
//! ```
//!
//! # Design Decisions
//! - Pool size is fixed per call: `n / 3`, at least 2, at most the usable CPUs
//! - Slots are keyed by input index, so completion order never leaks out
//! - The call returns only after every worker has been joined

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::Instrument;
use uuid::Uuid;

use crate::health::status::{HealthError, HealthStatus};
use crate::health::Inner;
use crate::observability::metrics;
use crate::probe::ProbeContext;

/// Lower bound on concurrent checks, however small the batch.
pub const MIN_CONCURRENCY: usize = 2;

/// Instances per worker before the pool grows.
const INSTANCES_PER_WORKER: usize = 3;

/// Concurrency cap for a batch of `instances` on `parallelism` CPUs.
///
/// Batches too small to earn more than the floor get [`MIN_CONCURRENCY`]
/// even on a single CPU; larger ones are capped by `parallelism`.
pub fn concurrency_cap(instances: usize, parallelism: usize) -> usize {
    let wanted = instances / INSTANCES_PER_WORKER;
    if wanted < MIN_CONCURRENCY {
        MIN_CONCURRENCY
    } else {
        wanted.min(parallelism.max(1))
    }
}

struct Job {
    index: usize,
    instance: String,
}

impl Inner {
    pub(crate) async fn check_all(
        self: &Arc<Self>,
        ctx: &ProbeContext,
        instances: Vec<String>,
    ) -> Vec<HealthStatus> {
        let total = instances.len();
        if total == 0 {
            return Vec::new();
        }

        let cap = concurrency_cap(total, self.parallelism.available().get());
        let workers = cap.min(total);
        let span = tracing::info_span!(
            "health_batch",
            batch_id = %Uuid::new_v4(),
            instances = total,
            concurrency = cap
        );
        metrics::record_batch(total, cap);

        let (job_tx, job_rx) = mpsc::channel::<Job>(cap);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<(usize, HealthStatus)>();

        let mut pool = JoinSet::new();
        for _ in 0..workers {
            let inner = Arc::clone(self);
            let ctx = ctx.clone();
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            pool.spawn(
                async move {
                    loop {
                        let next = job_rx.lock().await.recv().await;
                        let Some(job) = next else { break };

                        let job_ctx = ctx.child_with_timeout(inner.probe.timeout());
                        let status = inner.check(&job_ctx, &job.instance).await;
                        if result_tx.send((job.index, status)).is_err() {
                            break;
                        }
                    }
                }
                .instrument(span.clone()),
            );
        }
        drop(result_tx);

        for (index, instance) in instances.iter().enumerate() {
            let job = Job {
                index,
                instance: instance.clone(),
            };
            if job_tx.send(job).await.is_err() {
                // Every worker is gone; their slots are filled below.
                break;
            }
        }
        drop(job_tx);

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(parent: &span, error = %e, "health check worker failed");
            }
        }

        // Slots finished by a worker that later died are already queued here.
        let mut slots: Vec<Option<HealthStatus>> = (0..total).map(|_| None).collect();
        while let Some((index, status)) = result_rx.recv().await {
            slots[index] = Some(status);
        }

        slots
            .into_iter()
            .zip(instances)
            .map(|(slot, instance)| {
                slot.unwrap_or_else(|| HealthStatus::unknown(instance, HealthError::WorkerFailed))
            })
            .collect()
    }
}
