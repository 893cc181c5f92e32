//! In-process resolver backed by a map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::probe::ProbeContext;
use crate::resolver::{EnvMap, InstanceResolver, ResolveError};

/// Resolver whose instances and env maps are registered in memory.
///
/// The working directory of an instance is its own name, so
/// `read_config(working_directory(x))` returns the map registered for `x`.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    instances: RwLock<HashMap<String, EnvMap>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an instance's configuration.
    pub fn insert<I, K, V>(&self, instance: impl Into<String>, env: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env = env.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.write().insert(instance.into(), env);
    }

    /// Forget an instance.
    pub fn remove(&self, instance: &str) -> Option<EnvMap> {
        self.write().remove(instance)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, EnvMap>> {
        self.instances.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, EnvMap>> {
        self.instances.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl InstanceResolver for MemoryResolver {
    async fn exists(&self, _ctx: &ProbeContext, instance: &str) -> Result<bool, ResolveError> {
        Ok(self.read().contains_key(instance))
    }

    async fn working_directory(&self, instance: &str) -> Result<PathBuf, ResolveError> {
        if self.read().contains_key(instance) {
            Ok(PathBuf::from(instance))
        } else {
            Err(ResolveError::UnknownInstance(instance.to_string()))
        }
    }

    async fn read_config(&self, dir: &Path) -> Result<EnvMap, ResolveError> {
        let key = dir.to_string_lossy();
        self.read()
            .get(&*key)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownInstance(key.into_owned()))
    }
}
