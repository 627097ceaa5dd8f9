//! Shared coordination state for one build run.
//!
//! The host constructs a single [`Coordinator`] for the root module and passes
//! it by reference into every module activation. It holds the root reference,
//! the root-level configuration and the build-scoped cache, and runs the
//! cleanup step when the build completes.

use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntries, CacheKey, CacheStore};
use crate::config::{ConfigRegistry, DependencyConfig, PublishConfig};
use crate::error::{KeeperError, KeeperResult};
use crate::types::ModuleRef;

/// What [`Coordinator::finalize`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// The publishing marker was absent or empty; nothing was written
    Idle,
    /// The marker was cleared and the cache flushed
    Flushed,
    /// The marker was cleared but the flush failed; the previous file is intact
    FlushFailed,
}

/// Build-scoped coordination state.
///
/// Cache reads and writes take a single lock around the in-memory map and
/// never touch the disk, so they are safe to call from concurrent module
/// activation. Disk writes happen only in [`save_cache`](Self::save_cache),
/// which belongs to the single-threaded completion step.
#[derive(Debug)]
pub struct Coordinator {
    root: RwLock<Option<Arc<ModuleRef>>>,
    configs: ConfigRegistry,
    store: CacheStore,
    /// Loaded from `store` on first access
    entries: OnceLock<RwLock<CacheEntries>>,
}

impl Coordinator {
    /// Coordinator backed by `store`, with no root or configuration yet.
    pub fn new(store: CacheStore) -> Self {
        Self {
            root: RwLock::new(None),
            configs: ConfigRegistry::new(),
            store,
            entries: OnceLock::new(),
        }
    }

    /// Coordinator for `root` with the cache at its default location.
    pub fn for_root(root: ModuleRef) -> Self {
        let coordinator = Self::new(CacheStore::for_root(&root));
        coordinator.set_root(root);
        coordinator
    }

    // --- Root ---

    /// Record the root module. A second call replaces the first without error.
    pub fn set_root(&self, root: ModuleRef) {
        debug!("Root module: {} ({})", root.name(), root.project_dir().display());
        *self.root.write() = Some(Arc::new(root));
    }

    pub fn root(&self) -> KeeperResult<Arc<ModuleRef>> {
        self.root.read().clone().ok_or(KeeperError::RootNotSet)
    }

    // --- Configuration ---

    pub fn set_dependency_config(&self, config: impl Into<Arc<DependencyConfig>>) {
        self.configs.set_dependency(config);
    }

    pub fn set_publish_config(&self, config: impl Into<Arc<PublishConfig>>) {
        self.configs.set_publish(config);
    }

    pub fn dependency_config(&self) -> KeeperResult<Arc<DependencyConfig>> {
        self.configs.dependency()
    }

    pub fn publish_config(&self) -> KeeperResult<Arc<PublishConfig>> {
        self.configs.publish()
    }

    pub fn configs(&self) -> &ConfigRegistry {
        &self.configs
    }

    pub fn cache_store(&self) -> &CacheStore {
        &self.store
    }

    // --- Cache ---

    fn entries(&self) -> &RwLock<CacheEntries> {
        self.entries
            .get_or_init(|| RwLock::new(self.store.load()))
    }

    /// Current value for `key`, or `default` when absent.
    pub fn get_cache(&self, key: &str, default: &str) -> String {
        self.entries()
            .read()
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Insert or overwrite `key` in memory. Nothing is written to disk.
    pub fn set_cache(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries().write().insert(key.into(), value.into());
    }

    /// Remove `key` from memory; an absent key is a no-op.
    pub fn clear_cache(&self, key: &str) {
        self.entries().write().remove(key);
    }

    /// Typed lookup; `None` when absent.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries().read().get(&key.to_string()).cloned()
    }

    /// Typed insert or overwrite.
    pub fn set(&self, key: &CacheKey, value: impl Into<String>) {
        self.set_cache(key.to_string(), value);
    }

    /// Typed removal.
    pub fn clear(&self, key: &CacheKey) {
        self.clear_cache(&key.to_string());
    }

    /// Copy of the in-memory cache
    pub fn snapshot(&self) -> CacheEntries {
        self.entries().read().clone()
    }

    /// Write the full in-memory cache to disk.
    ///
    /// Call only from the completion step; concurrent calls would race on the
    /// backing file.
    pub fn save_cache(&self) -> anyhow::Result<()> {
        let entries = self.snapshot();
        self.store.flush(&entries)
    }

    // --- Completion ---

    /// Build completion step.
    ///
    /// When a transient key (the publishing marker) holds a value, every
    /// transient key is cleared and the cache flushed. Otherwise the persisted
    /// file is left untouched. Repeated calls after the marker is gone do nothing.
    pub fn finalize(&self) -> FinalizeOutcome {
        let active: Vec<String> = self
            .entries()
            .read()
            .iter()
            .filter(|(key, value)| !value.is_empty() && CacheKey::parse(key).is_transient())
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        if active.is_empty() {
            debug!("No publishing marker, cache left as is");
            return FinalizeOutcome::Idle;
        }

        info!("Clearing transient cache keys: {}", active.join(", "));
        self.entries()
            .write()
            .retain(|key, _| !CacheKey::parse(key).is_transient());
        match self.save_cache() {
            Ok(()) => FinalizeOutcome::Flushed,
            Err(e) => {
                warn!("Failed to save cache on build completion: {:#}", e);
                FinalizeOutcome::FlushFailed
            }
        }
    }
}
