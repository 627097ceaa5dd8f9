//! Per-module activation
//!
//! For every module the host enumerates, the activator hands the shared
//! dependency configuration to the dependency-conversion collaborator and the
//! shared publish configuration to the publish-convention collaborator.
//! Collaborators are traits so hosts can plug in their own; closures with the
//! matching signature implement them directly.

use tracing::debug;

use crate::config::{DependencyConfig, PublishConfig};
use crate::coordinator::Coordinator;
use crate::error::KeeperResult;
use crate::publish::PublishPlan;
use crate::types::{Dependency, ModuleRef};

/// Converts a module's declared dependency shorthands into repository
/// coordinates or local module substitutions.
///
/// Implementations may memoize results through the coordinator's cache. They
/// must not depend on the order in which sibling modules are activated.
pub trait DependencyConverter: Send + Sync {
    fn convert(
        &self,
        module: &ModuleRef,
        config: &DependencyConfig,
        coordinator: &Coordinator,
    ) -> KeeperResult<Vec<Dependency>>;
}

/// Applies publishing conventions to one module.
///
/// Returns `None` when the module does not publish.
pub trait PublishConvention: Send + Sync {
    fn apply(
        &self,
        module: &ModuleRef,
        config: &PublishConfig,
        coordinator: &Coordinator,
    ) -> KeeperResult<Option<PublishPlan>>;
}

impl<F> DependencyConverter for F
where
    F: Fn(&ModuleRef, &DependencyConfig, &Coordinator) -> KeeperResult<Vec<Dependency>>
        + Send
        + Sync,
{
    fn convert(
        &self,
        module: &ModuleRef,
        config: &DependencyConfig,
        coordinator: &Coordinator,
    ) -> KeeperResult<Vec<Dependency>> {
        self(module, config, coordinator)
    }
}

impl<F> PublishConvention for F
where
    F: Fn(&ModuleRef, &PublishConfig, &Coordinator) -> KeeperResult<Option<PublishPlan>>
        + Send
        + Sync,
{
    fn apply(
        &self,
        module: &ModuleRef,
        config: &PublishConfig,
        coordinator: &Coordinator,
    ) -> KeeperResult<Option<PublishPlan>> {
        self(module, config, coordinator)
    }
}

/// Result of activating one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    /// Module path
    pub module: String,
    /// Dependencies produced by conversion
    pub dependencies: Vec<Dependency>,
    /// Publish plan, when the module publishes
    pub publish: Option<PublishPlan>,
}

/// Entry point run once per module
pub struct ModuleActivator {
    converter: Box<dyn DependencyConverter>,
    convention: Box<dyn PublishConvention>,
}

impl ModuleActivator {
    pub fn new(
        converter: impl DependencyConverter + 'static,
        convention: impl PublishConvention + 'static,
    ) -> Self {
        Self {
            converter: Box::new(converter),
            convention: Box::new(convention),
        }
    }

    /// Activate `module` against the shared coordination state.
    ///
    /// Fails with a usage error when either configuration has not been set.
    pub fn activate(
        &self,
        coordinator: &Coordinator,
        module: &ModuleRef,
    ) -> KeeperResult<ActivationReport> {
        debug!("Activating module {}", module);

        let dependency_config = coordinator.dependency_config()?;
        let dependencies = self
            .converter
            .convert(module, &dependency_config, coordinator)?;

        let publish_config = coordinator.publish_config()?;
        let publish = self
            .convention
            .apply(module, &publish_config, coordinator)?;

        Ok(ActivationReport {
            module: module.path().to_string(),
            dependencies,
            publish,
        })
    }
}

impl std::fmt::Debug for ModuleActivator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleActivator").finish_non_exhaustive()
    }
}
