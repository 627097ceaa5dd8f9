//! Configuration schema for keeper.toml
//!
//! ```toml
//! [dependency]
//! default_group = "com.example"
//! exclusions = ["com.legacy:*"]
//!
//! [dependency.version_overrides]
//! libX = "1.2.3"
//!
//! [publish]
//! group = "com.example"
//! version = "2.0.0"
//! release_repository = "https://repo.example.com/releases"
//! opt_out = [":samples"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use url::Url;

use crate::error::{KeeperError, KeeperResult};
use crate::types::UNSPECIFIED_VERSION;

/// Root configuration structure for keeper.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeeperConfig {
    /// Dependency conversion settings
    #[serde(default)]
    pub dependency: DependencyConfig,

    /// Publishing settings
    #[serde(default)]
    pub publish: PublishConfig,
}

/// Dependency configuration declared at root scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyConfig {
    /// Prefix of dependency-type declarations in `local.properties`
    #[serde(default = "default_dependency_key")]
    pub dependency_key: String,

    /// Group used for shorthands that only name an artifact
    #[serde(default)]
    pub default_group: Option<String>,

    /// Version overrides keyed by `group:artifact` or bare artifact name
    #[serde(default)]
    pub version_overrides: BTreeMap<String, String>,

    /// Exclusion rules: `group:artifact`, bare artifact, or a `*`-terminated prefix
    #[serde(default)]
    pub exclusions: Vec<String>,

    /// Convention toggles
    #[serde(default)]
    pub conventions: DependencyConventions,

    /// Local module substituting a `source` dependency, keyed by
    /// `group:artifact` or bare artifact name (defaults to `:<artifact>`)
    #[serde(default)]
    pub local_paths: BTreeMap<String, String>,

    /// Directory for the persisted cache (defaults to the root build directory)
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

fn default_dependency_key() -> String {
    "dependency".to_string()
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            dependency_key: default_dependency_key(),
            default_group: None,
            version_overrides: BTreeMap::new(),
            exclusions: Vec::new(),
            conventions: DependencyConventions::default(),
            local_paths: BTreeMap::new(),
            cache_path: None,
        }
    }
}

impl DependencyConfig {
    /// Set a version override (builder style, for hosts declaring config in code)
    pub fn with_override(mut self, key: impl Into<String>, version: impl Into<String>) -> Self {
        self.version_overrides.insert(key.into(), version.into());
        self
    }

    /// Add an exclusion rule
    pub fn with_exclusion(mut self, rule: impl Into<String>) -> Self {
        self.exclusions.push(rule.into());
        self
    }

    /// Version override for an artifact; `group:artifact` wins over the bare name.
    pub fn override_for(&self, group: &str, artifact: &str) -> Option<&str> {
        self.version_overrides
            .get(&format!("{}:{}", group, artifact))
            .or_else(|| self.version_overrides.get(artifact))
            .map(String::as_str)
    }

    /// Map a local module onto an artifact for `source` substitution
    pub fn with_local_path(mut self, key: impl Into<String>, module_path: impl Into<String>) -> Self {
        self.local_paths.insert(key.into(), module_path.into());
        self
    }

    /// Module path building the artifact locally; `group:artifact` wins over the bare name.
    pub fn local_path_for(&self, group: &str, artifact: &str) -> String {
        self.local_paths
            .get(&format!("{}:{}", group, artifact))
            .or_else(|| self.local_paths.get(artifact))
            .cloned()
            .unwrap_or_else(|| format!(":{}", artifact))
    }

    /// Whether an exclusion rule matches the artifact
    pub fn is_excluded(&self, group: &str, artifact: &str) -> bool {
        let module_id = format!("{}:{}", group, artifact);
        self.exclusions.iter().any(|rule| match rule.strip_suffix('*') {
            Some(prefix) => module_id.starts_with(prefix) || artifact.starts_with(prefix),
            None => rule == &module_id || rule == artifact,
        })
    }

    /// Stable digest of the configuration, used to scope memoized conversions.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let hash = blake3::hash(&bytes).to_hex();
        hash[..16].to_string()
    }

    /// Validate the options consumed by dependency conversion
    pub fn validate(&self) -> KeeperResult<()> {
        if self.dependency_key.trim().is_empty() {
            return Err(KeeperError::config_invalid(
                "dependency",
                "'dependency_key' can not be empty, 'dependency' for default",
            ));
        }
        for (key, version) in &self.version_overrides {
            if version.trim().is_empty() || version == UNSPECIFIED_VERSION {
                return Err(KeeperError::config_invalid(
                    "dependency",
                    format!("version override for '{}' has no version", key),
                ));
            }
        }
        for (key, path) in &self.local_paths {
            if !path.starts_with(':') {
                return Err(KeeperError::config_invalid(
                    "dependency",
                    format!("local path for '{}' must be a module path like ':{}'", key, key),
                ));
            }
        }
        if self.exclusions.iter().any(|rule| rule.trim().is_empty()) {
            return Err(KeeperError::config_invalid(
                "dependency",
                "exclusion rules can not be empty",
            ));
        }
        Ok(())
    }
}

/// Toggles for dependency conversion conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyConventions {
    /// Append `-SNAPSHOT` to dependencies declared as snapshot
    #[serde(default = "default_true")]
    pub snapshot_suffix: bool,

    /// Overrides replace explicitly declared versions (otherwise they only fill gaps)
    #[serde(default = "default_true")]
    pub override_declared: bool,
}

impl Default for DependencyConventions {
    fn default() -> Self {
        Self {
            snapshot_suffix: true,
            override_declared: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Publish configuration declared at root scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Master switch for publish conventions
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Group of every published artifact
    #[serde(default)]
    pub group: Option<String>,

    /// Prefix prepended to the module name to form the artifact id
    #[serde(default)]
    pub artifact_prefix: String,

    /// Version of every published artifact
    #[serde(default)]
    pub version: Option<String>,

    /// Repository receiving release publications
    #[serde(default)]
    pub release_repository: Option<Url>,

    /// Repository receiving snapshot publications
    #[serde(default)]
    pub snapshot_repository: Option<Url>,

    /// Local repository receiving both publications
    #[serde(default)]
    pub local_repository: Option<Url>,

    /// Module paths that never publish
    #[serde(default)]
    pub opt_out: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            group: None,
            artifact_prefix: String::new(),
            version: None,
            release_repository: None,
            snapshot_repository: None,
            local_repository: None,
            opt_out: Vec::new(),
        }
    }
}

impl PublishConfig {
    /// Whether the module at `path` takes part in publishing
    pub fn publishes(&self, path: &str) -> bool {
        self.enabled && !self.opt_out.iter().any(|p| p == path)
    }

    /// Validate the options consumed by the publish conventions
    pub fn validate(&self) -> KeeperResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.group.as_deref().is_none_or(|g| g.trim().is_empty()) {
            return Err(KeeperError::config_invalid(
                "publish",
                "'group' is required when publishing is enabled",
            ));
        }
        if self.version.as_deref().is_none_or(|v| v.trim().is_empty()) {
            return Err(KeeperError::config_invalid(
                "publish",
                "'version' is required when publishing is enabled",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_prefers_qualified_key() {
        let config = DependencyConfig::default()
            .with_override("libX", "1.0.0")
            .with_override("com.example:libX", "2.0.0");

        assert_eq!(config.override_for("com.example", "libX"), Some("2.0.0"));
        assert_eq!(config.override_for("org.other", "libX"), Some("1.0.0"));
        assert_eq!(config.override_for("org.other", "libY"), None);
    }

    #[test]
    fn exclusion_rules_match_exact_and_prefix() {
        let config = DependencyConfig::default()
            .with_exclusion("com.legacy:*")
            .with_exclusion("debug-tools");

        assert!(config.is_excluded("com.legacy", "anything"));
        assert!(config.is_excluded("com.example", "debug-tools"));
        assert!(!config.is_excluded("com.example", "debug-tools-extra"));
        assert!(!config.is_excluded("com.example", "core"));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let base = DependencyConfig::default();
        let changed = DependencyConfig::default().with_override("libX", "1.2.3");

        assert_eq!(base.fingerprint(), DependencyConfig::default().fingerprint());
        assert_ne!(base.fingerprint(), changed.fingerprint());
        assert_eq!(base.fingerprint().len(), 16);
    }

    #[test]
    fn local_path_defaults_to_artifact_module() {
        let config = DependencyConfig::default()
            .with_local_path("imageloader", ":libs:image")
            .with_local_path("org.vendor:imageloader", ":vendor:image");

        assert_eq!(config.local_path_for("com.example", "network"), ":network");
        assert_eq!(config.local_path_for("com.example", "imageloader"), ":libs:image");
        assert_eq!(config.local_path_for("org.vendor", "imageloader"), ":vendor:image");
    }

    #[test]
    fn validate_rejects_relative_local_path() {
        let config = DependencyConfig::default().with_local_path("network", "libs/network");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unspecified_override() {
        let config = DependencyConfig::default().with_override("libX", "unspecified");
        assert!(matches!(
            config.validate(),
            Err(KeeperError::ConfigInvalid { section: "dependency", .. })
        ));
    }

    #[test]
    fn disabled_publish_config_needs_no_coordinates() {
        let config = PublishConfig {
            enabled: false,
            ..PublishConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.publishes(":lib"));
    }

    #[test]
    fn enabled_publish_config_requires_group() {
        let config = PublishConfig {
            version: Some("1.0".into()),
            ..PublishConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
