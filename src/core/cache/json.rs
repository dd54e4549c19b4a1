//! JSON document store for persistent storage.

use super::{CacheDocument, CacheStore};
use crate::error::CacheError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One JSON file holding the whole cache document
///
/// Every save rewrites the full file. Writes are neither atomic nor
/// locked: two invocations saving at the same moment can lose each
/// other's entries.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Per-user cache file in the system temporary directory
pub fn default_cache_path() -> PathBuf {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|name| !name.is_empty())
        .or_else(|| {
            dirs::home_dir()
                .and_then(|home| home.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "default".to_string());

    std::env::temp_dir().join(format!("find-duplicate-images-{user}-cache.json"))
}

impl CacheStore for JsonFileStore {
    fn load(&self) -> Result<CacheDocument, CacheError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cache store yet, starting empty");
                return Ok(CacheDocument::default());
            }
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| CacheError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, document: &CacheDocument) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| CacheError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        let bytes = serde_json::to_vec(document).map_err(CacheError::Serialize)?;
        fs::write(&self.path, bytes).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            path = %self.path.display(),
            fingerprints = document.fingerprints.len(),
            similarities = document.similarities.len(),
            "cache store written"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
