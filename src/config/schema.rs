//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the checker.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the health checker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HealthConfig {
    /// Probe settings (timeout, endpoint shape, port key).
    pub probe: ProbeConfig,

    /// Where instance units and env files live.
    pub resolver: ResolverConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-instance deadline in milliseconds.
    pub timeout_ms: u64,

    /// Host the health endpoint listens on.
    pub host: String,

    /// Path to probe.
    pub path: String,

    /// Env key holding the health port.
    pub port_key: String,

    /// User agent sent with each probe.
    pub user_agent: String,
}

impl ProbeConfig {
    /// Per-instance deadline as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            host: "localhost".to_string(),
            path: "/health".to_string(),
            port_key: "HEALTH_CHECK_PORT".to_string(),
            user_agent: concat!("instance-health/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Systemd resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Directory holding the service unit files.
    pub unit_dir: String,

    /// Unit file name prefix placed before the instance name.
    pub unit_prefix: String,

    /// Unit file name suffix placed after the instance name.
    pub unit_suffix: String,

    /// Env file name, relative to the instance working directory.
    pub env_file: String,

    /// systemctl binary used for the existence check.
    pub systemctl: String,
}

impl ResolverConfig {
    /// Unit name for an instance, e.g. `hydraserver-main.service`.
    pub fn unit_name(&self, instance: &str) -> String {
        format!("{}{}{}", self.unit_prefix, instance, self.unit_suffix)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            unit_dir: "/etc/systemd/system".to_string(),
            unit_prefix: "hydraserver-".to_string(),
            unit_suffix: ".service".to_string(),
            env_file: ".env".to_string(),
            systemctl: "systemctl".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
