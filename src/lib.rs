//! Bounded-concurrency health probing for named service instances.
//!
//! ```text
//! HealthChecker
//!   ├── get_status        → pipeline (exists → config → port → GET)
//!   └── get_status_batch  → fan-out worker pool → pipeline per instance
//!
//! InstanceResolver (systemd / memory)   ProbeExecutor (hyper)   Parallelism
//! ```

pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod resolver;

pub use config::HealthConfig;
pub use health::{HealthChecker, HealthError, HealthState, HealthStatus};
pub use probe::ProbeContext;
