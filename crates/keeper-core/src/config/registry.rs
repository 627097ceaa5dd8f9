//! Holder of the two root-level configuration instances.

use parking_lot::RwLock;
use std::sync::Arc;

use super::schema::{DependencyConfig, KeeperConfig, PublishConfig};
use crate::error::{KeeperError, KeeperResult};

/// One dependency and one publish configuration for the lifetime of a build.
///
/// Modules receive shared references; an instance is never copied per module.
/// Replacing an instance only affects readers that look it up afterwards.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    dependency: RwLock<Option<Arc<DependencyConfig>>>,
    publish: RwLock<Option<Arc<PublishConfig>>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated from a parsed keeper.toml
    pub fn from_config(config: KeeperConfig) -> Self {
        let registry = Self::new();
        registry.set_dependency(config.dependency);
        registry.set_publish(config.publish);
        registry
    }

    pub fn set_dependency(&self, config: impl Into<Arc<DependencyConfig>>) {
        *self.dependency.write() = Some(config.into());
    }

    pub fn set_publish(&self, config: impl Into<Arc<PublishConfig>>) {
        *self.publish.write() = Some(config.into());
    }

    /// Shared dependency configuration
    pub fn dependency(&self) -> KeeperResult<Arc<DependencyConfig>> {
        self.dependency
            .read()
            .clone()
            .ok_or(KeeperError::DependencyConfigNotSet)
    }

    /// Shared publish configuration
    pub fn publish(&self) -> KeeperResult<Arc<PublishConfig>> {
        self.publish
            .read()
            .clone()
            .ok_or(KeeperError::PublishConfigNotSet)
    }

    pub fn is_populated(&self) -> bool {
        self.dependency.read().is_some() && self.publish.read().is_some()
    }
}
