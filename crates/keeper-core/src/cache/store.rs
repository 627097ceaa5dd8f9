//! Cache persistence under the root module's build directory
//!
//! The file is written atomically (tmp + rename), so a process killed
//! mid-flush leaves the previous contents in place. Any read or parse failure
//! degrades to an empty cache: every entry can be recomputed.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::CacheEntries;
use crate::config::DependencyConfig;
use crate::types::ModuleRef;

/// File name of the persisted cache
pub const CACHE_FILE_NAME: &str = "cache.json";

/// Current on-disk format version
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Directory under the root build directory holding keeper state
const STATE_DIR_NAME: &str = "keeper";

/// On-disk representation
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(default)]
    entries: CacheEntries,
}

/// Durable key/value store backing the coordinator's cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Store backed by an explicit file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by `cache.json` inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CACHE_FILE_NAME))
    }

    /// Default location: `<root build dir>/keeper/cache.json`
    pub fn for_root(root: &ModuleRef) -> Self {
        Self::in_dir(root.build_dir().join(STATE_DIR_NAME))
    }

    /// Location honoring `cache_path`; relative paths resolve against the root project.
    pub fn locate(root: &ModuleRef, config: &DependencyConfig) -> Self {
        match &config.cache_path {
            Some(dir) if dir.is_absolute() => Self::in_dir(dir),
            Some(dir) => Self::in_dir(root.project_dir().join(dir)),
            None => Self::for_root(root),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last flushed entries.
    ///
    /// Returns an empty map when the file is missing, unreadable, corrupt or
    /// written by an unsupported format version.
    pub fn load(&self) -> CacheEntries {
        match self.try_load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring unusable cache {}: {:#}", self.path.display(), e);
                CacheEntries::new()
            }
        }
    }

    /// Load the last flushed entries, reporting why a present file is unusable.
    pub fn try_load(&self) -> anyhow::Result<CacheEntries> {
        if !self.path.exists() {
            debug!("No cache at {}, starting empty", self.path.display());
            return Ok(CacheEntries::new());
        }

        let bytes = fs::read(&self.path)
            .with_context(|| format!("Failed to read cache: {}", self.path.display()))?;
        let file: CacheFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse cache: {}", self.path.display()))?;
        if file.version != CACHE_FORMAT_VERSION {
            anyhow::bail!("Unsupported cache version: {}", file.version);
        }

        debug!(
            "Loaded {} cache entries saved at {}",
            file.entries.len(),
            file.saved_at
        );
        Ok(file.entries)
    }

    /// Replace the persisted entries atomically (tmp + rename)
    pub fn flush(&self, entries: &CacheEntries) -> anyhow::Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| CACHE_FILE_NAME.to_string());
        let tmp_path = dir.join(format!("{}.{}.tmp", file_name, std::process::id()));

        let file = CacheFile {
            version: CACHE_FORMAT_VERSION,
            saved_at: Utc::now(),
            entries: entries.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&file).context("Failed to serialize cache")?;

        fs::write(&tmp_path, bytes)
            .with_context(|| format!("Failed to write tmp cache: {}", tmp_path.display()))?;

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e).with_context(|| {
                format!("Failed to rename tmp cache: {}", tmp_path.display())
            });
        }

        debug!("Flushed {} cache entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Delete the persisted file. A missing file is not an error.
    pub fn remove(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove cache: {}", self.path.display())),
        }
    }
}
