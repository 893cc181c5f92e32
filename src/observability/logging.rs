//! Structured logging.
//!
//! `RUST_LOG` overrides the configured level. Logs go to stderr so command
//! output on stdout stays machine-readable.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

use crate::config::ObservabilityConfig;

/// Install the global subscriber. Fails if one is already set.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("instance_health={}", config.log_level)));

    let json = config
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let plain = (!config.json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .try_init()
}
