//! Host-facing sequencing of one build run.
//!
//! `BuildSession` wires the two lifecycle hooks a host provides ("root module
//! identified" and "build completed") to the coordinator, and runs module
//! activation in between.

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use anyhow::Context;

use crate::activator::{ActivationReport, ModuleActivator};
use crate::cache::CacheStore;
use crate::config::{
    DependencyConfig, DependencyDeclarations, KeeperConfig, PublishConfig, load_root_config,
};
use crate::convert::ShorthandConverter;
use crate::coordinator::{Coordinator, FinalizeOutcome};
use crate::error::KeeperResult;
use crate::publish::PublishPlanner;
use crate::types::ModuleRef;

/// One build run: a coordinator scoped to the root plus the module activator.
#[derive(Debug)]
pub struct BuildSession {
    coordinator: Coordinator,
    activator: ModuleActivator,
}

impl BuildSession {
    /// Start a session for `root` with configuration declared in code.
    ///
    /// The cache location honors `dependency.cache_path`.
    pub fn new(
        root: ModuleRef,
        dependency: DependencyConfig,
        publish: PublishConfig,
        activator: ModuleActivator,
    ) -> Self {
        let coordinator = Coordinator::new(CacheStore::locate(&root, &dependency));
        coordinator.set_root(root);
        coordinator.set_dependency_config(dependency);
        coordinator.set_publish_config(publish);
        Self {
            coordinator,
            activator,
        }
    }

    /// Start a session for `root`, reading `keeper.toml` from its project directory.
    pub fn from_root_config(root: ModuleRef, activator: ModuleActivator) -> anyhow::Result<Self> {
        let KeeperConfig {
            dependency,
            publish,
        } = load_root_config(root.project_dir())?;
        Ok(Self::new(root, dependency, publish, activator))
    }

    /// Start a session with the default collaborators.
    ///
    /// Reads `keeper.toml` and `local.properties` from the root project
    /// directory, hands the declarations to `converter` and plans publishing
    /// with [`PublishPlanner`].
    pub fn open(root: ModuleRef, converter: ShorthandConverter) -> anyhow::Result<Self> {
        let KeeperConfig {
            dependency,
            publish,
        } = load_root_config(root.project_dir())?;
        let declarations =
            DependencyDeclarations::load(root.project_dir(), &dependency.dependency_key)
                .context("Failed to load dependency declarations")?;
        for (ty, names) in declarations.group_by_type() {
            info!("{} dependencies: {}", ty, names.join(", "));
        }

        let activator = ModuleActivator::new(
            converter.with_declarations(declarations),
            PublishPlanner::new(),
        );
        Ok(Self::new(root, dependency, publish, activator))
    }

    pub fn root(&self) -> KeeperResult<Arc<ModuleRef>> {
        self.coordinator.root()
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Activate one module. Safe to call from several threads at once.
    pub fn activate(&self, module: &ModuleRef) -> KeeperResult<ActivationReport> {
        self.activator.activate(&self.coordinator, module)
    }

    /// Activate modules in the order given, stopping at the first failure.
    pub fn activate_all<'a>(
        &self,
        modules: impl IntoIterator<Item = &'a ModuleRef>,
    ) -> KeeperResult<Vec<ActivationReport>> {
        modules
            .into_iter()
            .map(|module| self.activate(module))
            .collect()
    }

    /// Run the build completion step. Consumes the session so it runs once.
    pub fn finish(self) -> FinalizeOutcome {
        let outcome = self.coordinator.finalize();
        info!("Build finished: {:?}", outcome);
        outcome
    }

    /// Cache file of this session
    pub fn cache_path(&self) -> &Path {
        self.coordinator.cache_store().path()
    }
}
