//! systemd-backed resolver.
//!
//! # Responsibilities
//! - Existence via `systemctl is-active --quiet <unit>`
//! - Working directory from the unit file's `WorkingDirectory=`
//! - Env file read from that directory

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::ResolverConfig;
use crate::probe::ProbeContext;
use crate::resolver::env_file::read_env_file;
use crate::resolver::unit_file::parse_working_directory;
use crate::resolver::{EnvMap, InstanceResolver, ResolveError};

/// `systemctl is-active` exit code for "no such unit".
const UNIT_NOT_FOUND: i32 = 4;

/// Resolves instances installed as systemd service units.
#[derive(Debug, Clone)]
pub struct SystemdResolver {
    config: ResolverConfig,
}

impl SystemdResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Full path of the unit file for `instance`.
    pub fn unit_path(&self, instance: &str) -> PathBuf {
        Path::new(&self.config.unit_dir).join(self.config.unit_name(instance))
    }
}

impl Default for SystemdResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

#[async_trait]
impl InstanceResolver for SystemdResolver {
    async fn exists(&self, ctx: &ProbeContext, instance: &str) -> Result<bool, ResolveError> {
        let unit = self.config.unit_name(instance);
        let status = Command::new(&self.config.systemctl)
            .args(["is-active", "--quiet", unit.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        let status = match ctx.run(status).await {
            Ok(result) => result.map_err(|e| ResolveError::Lookup {
                instance: instance.to_string(),
                reason: format!("{} is-active: {e}", self.config.systemctl),
            })?,
            Err(interrupted) => {
                return Err(ResolveError::Lookup {
                    instance: instance.to_string(),
                    reason: interrupted.to_string(),
                })
            }
        };

        // Active, inactive and failed units all exist; only exit 4 means absent.
        let exists = status.code() != Some(UNIT_NOT_FOUND);
        tracing::trace!(%unit, code = ?status.code(), exists, "unit lookup");
        Ok(exists)
    }

    async fn working_directory(&self, instance: &str) -> Result<PathBuf, ResolveError> {
        let path = self.unit_path(instance);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ResolveError::UnitFile {
                path: path.clone(),
                source,
            })?;

        parse_working_directory(&contents)
            .map(PathBuf::from)
            .ok_or(ResolveError::MissingWorkingDirectory { path })
    }

    async fn read_config(&self, dir: &Path) -> Result<EnvMap, ResolveError> {
        read_env_file(&dir.join(&self.config.env_file)).await
    }
}
