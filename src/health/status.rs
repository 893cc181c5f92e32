//! Health check results and their error causes.

use std::fmt;
use std::num::ParseIntError;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::probe::{ProbeError, ProbeVerdict};
use crate::resolver::ResolveError;

/// Outcome category of a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// The endpoint answered 200.
    Healthy,
    /// The endpoint answered, but not with 200.
    Unhealthy,
    /// The check could not reach a verdict; an error cause is attached.
    Unknown,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Healthy => "healthy",
            HealthState::Unhealthy => "unhealthy",
            HealthState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a check ended in [`HealthState::Unknown`].
#[derive(Debug, Error)]
pub enum HealthError {
    /// The instance is not registered.
    #[error("instance does not exist")]
    NotFound,

    /// The existence lookup failed.
    #[error(transparent)]
    Lookup(ResolveError),

    /// Working directory or env file could not be resolved.
    #[error(transparent)]
    Config(ResolveError),

    /// The env file lacks the port key.
    #[error("{key} is missing")]
    MissingPort { key: String },

    /// The port key holds something that is not a port number.
    #[error("invalid {key} value {value:?}: {source}")]
    InvalidPort {
        key: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// The probe got no HTTP response.
    #[error(transparent)]
    Probe(ProbeError),

    /// The caller's context was cancelled.
    #[error("health check cancelled")]
    Cancelled,

    /// The deadline passed while the instance was still being resolved.
    #[error("health check deadline exceeded after {}ms", .timeout.as_millis())]
    DeadlineExceeded { timeout: Duration },

    /// The worker running this check died before reporting.
    #[error("health check worker failed")]
    WorkerFailed,
}

impl HealthError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            HealthError::Cancelled | HealthError::Probe(ProbeError::Cancelled)
        )
    }
}

/// Result of one health check.
///
/// `state` is `Unknown` exactly when `error` is set; the constructors are the
/// only way to build one.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    instance: String,
    #[serde(rename = "status")]
    state: HealthState,
    #[serde(
        serialize_with = "serialize_error",
        skip_serializing_if = "Option::is_none"
    )]
    error: Option<Arc<HealthError>>,
}

impl HealthStatus {
    pub fn healthy(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            state: HealthState::Healthy,
            error: None,
        }
    }

    pub fn unhealthy(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            state: HealthState::Unhealthy,
            error: None,
        }
    }

    pub fn unknown(instance: impl Into<String>, error: HealthError) -> Self {
        Self {
            instance: instance.into(),
            state: HealthState::Unknown,
            error: Some(Arc::new(error)),
        }
    }

    pub(crate) fn from_verdict(instance: impl Into<String>, verdict: ProbeVerdict) -> Self {
        match verdict {
            ProbeVerdict::Healthy => Self::healthy(instance),
            ProbeVerdict::Unhealthy => Self::unhealthy(instance),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn error(&self) -> Option<&HealthError> {
        self.error.as_deref()
    }

    pub fn is_healthy(&self) -> bool {
        self.state == HealthState::Healthy
    }
}

fn serialize_error<S>(error: &Option<Arc<HealthError>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(e) => serializer.serialize_str(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Where a resolved instance is probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub instance: String,
    pub port: u16,
}

impl ProbeTarget {
    /// `http://<host>:<port><path>`
    pub fn url(&self, host: &str, path: &str) -> String {
        format!("http://{}:{}{}", host, self.port, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_iff_error() {
        assert!(HealthStatus::healthy("a").error().is_none());
        assert!(HealthStatus::unhealthy("a").error().is_none());

        let status = HealthStatus::unknown("a", HealthError::NotFound);
        assert_eq!(status.state(), HealthState::Unknown);
        assert_eq!(status.error().unwrap().to_string(), "instance does not exist");
    }

    #[test]
    fn serializes_for_reports() {
        let json = serde_json::to_value(HealthStatus::unknown(
            "main",
            HealthError::MissingPort {
                key: "HEALTH_CHECK_PORT".into(),
            },
        ))
        .unwrap();
        assert_eq!(json["instance"], "main");
        assert_eq!(json["status"], "unknown");
        assert_eq!(json["error"], "HEALTH_CHECK_PORT is missing");

        let json = serde_json::to_value(HealthStatus::healthy("main")).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn probe_cancellation_counts_as_cancelled() {
        assert!(HealthError::Cancelled.is_cancelled());
        assert!(HealthError::Probe(ProbeError::Cancelled).is_cancelled());
        let expired = HealthError::DeadlineExceeded {
            timeout: Duration::from_millis(2000),
        };
        assert!(!expired.is_cancelled());
        assert_eq!(expired.to_string(), "health check deadline exceeded after 2000ms");
    }

    #[test]
    fn target_url() {
        let target = ProbeTarget {
            instance: "main".into(),
            port: 4445,
        };
        assert_eq!(
            target.url("localhost", "/health"),
            "http://localhost:4445/health"
        );
    }
}
