//! Default dependency-conversion collaborator
//!
//! Turns the shorthands a module declares (`name`, `group:name` or a full
//! `group:name:version`) into dependencies using the root dependency
//! configuration:
//! - exclusion rules drop the dependency
//! - version overrides replace or fill the version, per `override_declared`
//! - bare names take `default_group`
//! - names declared as snapshot in `local.properties` get a `-SNAPSHOT` version
//! - names declared as source are substituted by the local module building them
//!
//! Results are memoized in the coordinator cache, keyed by a fingerprint of
//! the configuration and declarations so an edit never reuses stale
//! conversions.

use std::collections::BTreeMap;
use tracing::debug;

use crate::activator::DependencyConverter;
use crate::cache::CacheKey;
use crate::config::{DependencyConfig, DependencyDeclarations};
use crate::coordinator::Coordinator;
use crate::error::{KeeperError, KeeperResult};
use crate::types::{Coordinate, Dependency, DependencyType, ModuleRef};

/// Memoized value recorded for an excluded shorthand
const EXCLUDED: &str = "";

/// Shorthand-to-coordinate converter
#[derive(Debug, Clone, Default)]
pub struct ShorthandConverter {
    /// Declared shorthands per module path
    declared: BTreeMap<String, Vec<String>>,
    /// Dependency types from `local.properties`
    declarations: DependencyDeclarations,
}

impl ShorthandConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the per-checkout dependency type declarations
    pub fn with_declarations(mut self, declarations: DependencyDeclarations) -> Self {
        self.declarations = declarations;
        self
    }

    /// Declare the dependency shorthands of a module
    pub fn declare<I, S>(mut self, module_path: impl Into<String>, shorthands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared
            .entry(module_path.into())
            .or_default()
            .extend(shorthands.into_iter().map(Into::into));
        self
    }

    /// Shorthands declared for a module
    pub fn declared_for(&self, module_path: &str) -> &[String] {
        self.declared
            .get(module_path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Convert one shorthand without touching any cache.
    ///
    /// Returns `None` when an exclusion rule matches.
    pub fn convert_one(
        &self,
        shorthand: &str,
        config: &DependencyConfig,
    ) -> KeeperResult<Option<Dependency>> {
        let parts: Vec<&str> = shorthand.trim().split(':').collect();
        let (group, artifact, declared_version) = match parts.as_slice() {
            [artifact] => (None, *artifact, None),
            [group, artifact] => (Some(*group), *artifact, None),
            [group, artifact, version] => (Some(*group), *artifact, Some(*version)),
            _ => {
                return Err(KeeperError::invalid_identifier(
                    shorthand,
                    "expected name, group:name or group:name:version",
                ));
            }
        };

        let group = match group.or(config.default_group.as_deref()) {
            Some(group) => group,
            None => {
                return Err(KeeperError::config_invalid(
                    "dependency",
                    format!("'{}' has no group and no 'default_group' is set", shorthand),
                ));
            }
        };

        if config.is_excluded(group, artifact) {
            debug!("Excluded dependency: {}", shorthand);
            return Ok(None);
        }

        let declared_type = self.declarations.get(artifact).unwrap_or_default();
        if declared_type == DependencyType::Source {
            let module_path = config.local_path_for(group, artifact);
            debug!("{} built from source by {}", shorthand, module_path);
            return Ok(Some(Dependency::local(
                format!("{}:{}", group, artifact),
                module_path,
            )));
        }

        let overridden = config.override_for(group, artifact);
        let version = match (declared_version, overridden) {
            (Some(_), Some(version)) if config.conventions.override_declared => version,
            (Some(declared), _) => declared,
            (None, Some(version)) => version,
            (None, None) => {
                return Err(KeeperError::invalid_identifier(
                    shorthand,
                    "no version declared and no version override configured",
                ));
            }
        };

        let coordinate = Coordinate::new(group, artifact, version)?;
        let snapshot =
            config.conventions.snapshot_suffix && declared_type == DependencyType::Snapshot;

        Ok(Some(Dependency::External(if snapshot {
            coordinate.to_snapshot()
        } else {
            coordinate
        })))
    }
}

impl DependencyConverter for ShorthandConverter {
    fn convert(
        &self,
        module: &ModuleRef,
        config: &DependencyConfig,
        coordinator: &Coordinator,
    ) -> KeeperResult<Vec<Dependency>> {
        config.validate()?;

        let fingerprint = self.fingerprint(config);
        let mut dependencies = Vec::new();

        for shorthand in self.declared_for(module.path()) {
            let key = CacheKey::conversion(fingerprint.as_str(), shorthand.as_str());
            let converted = match coordinator.get(&key) {
                Some(cached) if cached == EXCLUDED => None,
                Some(cached) => match Dependency::parse(&cached) {
                    Ok(dependency) => Some(dependency),
                    Err(_) => self.convert_and_remember(shorthand, config, coordinator, &key)?,
                },
                None => self.convert_and_remember(shorthand, config, coordinator, &key)?,
            };
            dependencies.extend(converted);
        }

        debug!("{}: {} dependencies converted", module, dependencies.len());
        Ok(dependencies)
    }
}

impl ShorthandConverter {
    /// Digest of everything a conversion result depends on
    fn fingerprint(&self, config: &DependencyConfig) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(config.fingerprint().as_bytes());
        for (name, ty) in self.declarations.iter() {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(ty.as_str().as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex()[..16].to_string()
    }

    fn convert_and_remember(
        &self,
        shorthand: &str,
        config: &DependencyConfig,
        coordinator: &Coordinator,
        key: &CacheKey,
    ) -> KeeperResult<Option<Dependency>> {
        let converted = self.convert_one(shorthand, config)?;
        let value = converted
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| EXCLUDED.to_string());
        coordinator.set(key, value);
        Ok(converted)
    }
}
