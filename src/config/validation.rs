//! Configuration validation.
//!
//! Serde handles the syntax; this checks value ranges and shapes. All problems
//! are reported, not just the first.

use thiserror::Error;

use crate::config::schema::HealthConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("probe.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("probe.{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("probe.path must start with '/', got {0:?}")]
    RelativePath(String),

    #[error("resolver.{field} must not be empty")]
    EmptyResolverField { field: &'static str },
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &HealthConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let probe = &config.probe;

    if probe.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if probe.host.trim().is_empty() {
        errors.push(ValidationError::EmptyField { field: "host" });
    }
    if probe.port_key.trim().is_empty() {
        errors.push(ValidationError::EmptyField { field: "port_key" });
    }
    if !probe.path.starts_with('/') {
        errors.push(ValidationError::RelativePath(probe.path.clone()));
    }

    let resolver = &config.resolver;
    for (field, value) in [
        ("unit_dir", &resolver.unit_dir),
        ("env_file", &resolver.env_file),
        ("systemctl", &resolver.systemctl),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyResolverField { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
