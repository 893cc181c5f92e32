//! `.env` file reading.

use std::path::Path;

use crate::resolver::{EnvMap, ResolveError};

/// Parse a `.env`-style file into a map without touching the process
/// environment.
pub async fn read_env_file(path: &Path) -> Result<EnvMap, ResolveError> {
    let to_error = |source: dotenvy::Error| ResolveError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| to_error(dotenvy::Error::Io(e)))?;

    dotenvy::from_read_iter(contents.as_bytes())
        .collect::<Result<EnvMap, _>>()
        .map_err(to_error)
}
