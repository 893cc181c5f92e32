//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HealthConfig (validated, immutable)
//!     → handed to HealthChecker::from_config
//! ```
//!
//! # Design Decisions
//! - All fields have defaults, so running without a file is valid
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::HealthConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProbeConfig;
pub use schema::ResolverConfig;
