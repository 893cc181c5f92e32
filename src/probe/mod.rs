//! Probe execution subsystem.
//!
//! # Data Flow
//! ```text
//! pipeline builds http://<host>:<port><path>
//!     → ProbeExecutor::fetch (one GET, bounded by ProbeContext)
//!     → 200            → ProbeVerdict::Healthy
//!     → any other code → ProbeVerdict::Unhealthy
//!     → no response    → ProbeError::Transport
//! ```
//!
//! # Design Decisions
//! - Single attempt, no retries
//! - Only the status code is inspected; the body is dropped
//! - Timeout, refused and DNS failures are one transport kind with a message

pub mod context;
pub mod http;

use async_trait::async_trait;
use thiserror::Error;

pub use context::{Interrupted, ProbeContext};
pub use http::HttpProbe;

/// Verdict of a probe that got an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeVerdict {
    Healthy,
    Unhealthy,
}

impl ProbeVerdict {
    /// 200 is healthy; every other status, including 2xx/3xx, is not.
    pub fn from_status(status: u16) -> Self {
        if status == 200 {
            ProbeVerdict::Healthy
        } else {
            ProbeVerdict::Unhealthy
        }
    }
}

/// Errors raised when a probe gets no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The request could not be built (bad URL).
    #[error("invalid health check request for {url}: {reason}")]
    InvalidRequest { url: String, reason: String },

    /// Connection, protocol or deadline failure.
    #[error("health check request failed: {reason}")]
    Transport { url: String, reason: String },

    /// The probe's context was cancelled before a response arrived.
    #[error("health check cancelled")]
    Cancelled,
}

/// Issues one health request and classifies the outcome.
#[async_trait]
pub trait ProbeExecutor: Send + Sync {
    async fn fetch(&self, ctx: &ProbeContext, url: &str) -> Result<ProbeVerdict, ProbeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_200_is_healthy() {
        assert_eq!(ProbeVerdict::from_status(200), ProbeVerdict::Healthy);
        for code in [201, 204, 301, 404, 500, 503] {
            assert_eq!(ProbeVerdict::from_status(code), ProbeVerdict::Unhealthy);
        }
    }
}
