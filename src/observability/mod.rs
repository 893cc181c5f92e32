//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! health pipeline / fan-out produce:
//!     → logging.rs (structured log events, batch spans)
//!     → metrics.rs (counters, histograms via the `metrics` facade)
//! ```
//!
//! # Design Decisions
//! - Structured fields (instance, batch_id) rather than formatted strings
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
