//! JSON persistence for the two pipeline outputs.
//!
//! Files are written pretty-printed with a 2-space indent. Each write goes to
//! a sibling temp file first and is renamed into place, so a reader never
//! sees a half-written document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::enrich::OwnerWebsite;
use crate::github::Repository;

/// Default output of the fetch stage.
pub const REPOS_FILE: &str = "all_top_repos.json";

/// Default output of the enrichment stage.
pub const WEBSITES_FILE: &str = "org_websites.json";

/// Errors reading or writing a JSON document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Serialize `value` to `path` as pretty JSON, replacing any existing file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let mut body = serde_json::to_vec_pretty(value).map_err(|e| StoreError::json(path, e))?;
    body.push(b'\n');

    let tmp = temp_path(path);
    fs::write(&tmp, &body).map_err(|e| StoreError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io(path, e));
    }

    tracing::debug!(path = %path.display(), bytes = body.len(), "Wrote JSON");
    Ok(())
}

/// Read and deserialize a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::json(path, e))
}

pub fn save_repositories(path: &Path, repos: &[Repository]) -> Result<(), StoreError> {
    write_json(path, repos)
}

pub fn load_repositories(path: &Path) -> Result<Vec<Repository>, StoreError> {
    read_json(path)
}

pub fn save_websites(path: &Path, records: &[OwnerWebsite]) -> Result<(), StoreError> {
    write_json(path, records)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
