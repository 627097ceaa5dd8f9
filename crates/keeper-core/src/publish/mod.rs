//! Default publish-convention collaborator
//!
//! Derives each module's coordinate (`<group>:<artifact_prefix><module name>:<version>`)
//! and the release and snapshot publications with their repository targets.
//! Signing and upload are left to the host.

use tracing::{debug, info};
use url::Url;

use crate::activator::PublishConvention;
use crate::cache::CacheKey;
use crate::config::PublishConfig;
use crate::coordinator::Coordinator;
use crate::error::{KeeperError, KeeperResult};
use crate::types::{Coordinate, DependencyType, ModuleRef};

/// One publication of a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// `Release` or `Snapshot`
    pub kind: DependencyType,
    pub coordinate: Coordinate,
    /// Repositories the publication targets, local repository first
    pub repositories: Vec<Url>,
}

/// Publishing settings resolved for one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    /// Module path
    pub module: String,
    /// Release coordinate of the module
    pub coordinate: Coordinate,
    pub publications: Vec<Publication>,
}

impl PublishPlan {
    pub fn release(&self) -> Option<&Publication> {
        self.publication(DependencyType::Release)
    }

    pub fn snapshot(&self) -> Option<&Publication> {
        self.publication(DependencyType::Snapshot)
    }

    fn publication(&self, kind: DependencyType) -> Option<&Publication> {
        self.publications.iter().find(|p| p.kind == kind)
    }
}

/// Applies the naming and repository conventions from [`PublishConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishPlanner;

impl PublishPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the plan for `module` without touching any shared state.
    ///
    /// Returns `None` when publishing is disabled or the module opted out.
    pub fn plan(
        &self,
        module: &ModuleRef,
        config: &PublishConfig,
    ) -> KeeperResult<Option<PublishPlan>> {
        if !config.publishes(module.path()) {
            debug!("{} does not publish", module);
            return Ok(None);
        }
        config.validate()?;

        let group = config.group.as_deref().unwrap_or_default();
        let version = config.version.as_deref().unwrap_or_default();
        let artifact = format!("{}{}", config.artifact_prefix, module.name());
        let coordinate = Coordinate::new(group, artifact, version).map_err(|e| match e {
            KeeperError::InvalidIdentifier { identifier, reason } => {
                KeeperError::invalid_identifier(identifier, format!("{} (module {})", reason, module))
            }
            other => other,
        })?;

        let release = Publication {
            kind: DependencyType::Release,
            coordinate: coordinate.clone(),
            repositories: targets(config, config.release_repository.as_ref()),
        };
        let snapshot = Publication {
            kind: DependencyType::Snapshot,
            coordinate: coordinate.to_snapshot(),
            repositories: targets(config, config.snapshot_repository.as_ref()),
        };

        Ok(Some(PublishPlan {
            module: module.path().to_string(),
            coordinate,
            publications: vec![release, snapshot],
        }))
    }

    /// Record that `module` is publishing during this build.
    ///
    /// The marker is transient: the coordinator clears it when the build completes.
    pub fn mark_publishing(coordinator: &Coordinator, module: &ModuleRef) {
        info!("Publishing {}", module);
        coordinator.set(&CacheKey::PublishingProject, module.path());
    }

    /// Module currently publishing, if any
    pub fn publishing(coordinator: &Coordinator) -> Option<String> {
        coordinator
            .get(&CacheKey::PublishingProject)
            .filter(|path| !path.is_empty())
    }

    /// Record that `module` has been published
    pub fn mark_done(coordinator: &Coordinator, module: &ModuleRef) {
        coordinator.set(&CacheKey::publish_done(module.path()), "true");
    }

    pub fn is_done(coordinator: &Coordinator, module: &ModuleRef) -> bool {
        coordinator.get_cache(&CacheKey::publish_done(module.path()).to_string(), "false") == "true"
    }

    /// Coordinate recorded for `module` by an earlier activation
    pub fn target(coordinator: &Coordinator, module: &ModuleRef) -> Option<Coordinate> {
        coordinator
            .get(&CacheKey::publish_target(module.path()))
            .and_then(|value| Coordinate::parse(&value).ok())
    }
}

fn targets(config: &PublishConfig, remote: Option<&Url>) -> Vec<Url> {
    config
        .local_repository
        .iter()
        .chain(remote)
        .cloned()
        .collect()
}

impl PublishConvention for PublishPlanner {
    fn apply(
        &self,
        module: &ModuleRef,
        config: &PublishConfig,
        coordinator: &Coordinator,
    ) -> KeeperResult<Option<PublishPlan>> {
        let plan = self.plan(module, config)?;
        if let Some(plan) = &plan {
            coordinator.set(
                &CacheKey::publish_target(module.path()),
                plan.coordinate.to_string(),
            );
        }
        Ok(plan)
    }
}
