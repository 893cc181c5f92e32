//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → cancel the root ProbeContext → every derived check context
//! ```

pub mod signals;
