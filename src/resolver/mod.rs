//! Instance configuration resolution.
//!
//! # Data Flow
//! ```text
//! instance name
//!     → exists()            (is the instance registered?)
//!     → working_directory() (where does it run from?)
//!     → read_config()       (key/value env file in that directory)
//!     → EnvMap handed back to the health pipeline
//! ```
//!
//! # Design Decisions
//! - The health engine only sees the `InstanceResolver` trait; resolvers are
//!   injected, never looked up globally
//! - `SystemdResolver` is the production backend, `MemoryResolver` serves
//!   embedding and tests

pub mod env_file;
pub mod memory;
pub mod systemd;
pub mod unit_file;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::probe::ProbeContext;

pub use memory::MemoryResolver;
pub use systemd::SystemdResolver;

/// Parsed key/value configuration of one instance.
pub type EnvMap = HashMap<String, String>;

/// Errors raised while locating or reading instance configuration.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The existence lookup itself failed.
    #[error("lookup of instance {instance} failed: {reason}")]
    Lookup { instance: String, reason: String },

    /// The service unit file could not be read.
    #[error("failed to open file {}: {source}", .path.display())]
    UnitFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The unit file has no usable `WorkingDirectory=` entry.
    #[error("no WorkingDirectory entry in {}", .path.display())]
    MissingWorkingDirectory { path: PathBuf },

    /// The env file is missing or malformed.
    #[error("failed to read env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    /// No configuration registered for the instance.
    #[error("no configuration for instance {0}")]
    UnknownInstance(String),
}

/// Capability that answers "does this instance exist and how is it configured".
#[async_trait]
pub trait InstanceResolver: Send + Sync {
    /// Whether the instance is registered.
    async fn exists(&self, ctx: &ProbeContext, instance: &str) -> Result<bool, ResolveError>;

    /// Directory the instance runs from.
    async fn working_directory(&self, instance: &str) -> Result<PathBuf, ResolveError>;

    /// Key/value configuration found in `dir`.
    async fn read_config(&self, dir: &Path) -> Result<EnvMap, ResolveError>;
}
