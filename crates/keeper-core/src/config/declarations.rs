//! Per-developer dependency type declarations.
//!
//! Read from `local.properties` in the root project directory, which is not
//! checked in. Each line `<key>.<name>=<type>` chooses how the artifact
//! `<name>` is consumed in this checkout, where `<key>` is
//! [`DependencyConfig::dependency_key`](super::DependencyConfig).
//!
//! ```text
//! dependency.network=source
//! dependency.imageloader=snapshot
//! ```

use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::KeeperResult;
use crate::types::DependencyType;

/// File holding the declarations
pub const DECLARATIONS_FILE_NAME: &str = "local.properties";

/// Declared dependency types keyed by artifact name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyDeclarations {
    entries: BTreeMap<String, DependencyType>,
}

impl DependencyDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load declarations from `local.properties` in `project_dir`.
    ///
    /// A missing file yields no declarations.
    pub fn load(project_dir: &Path, dependency_key: &str) -> anyhow::Result<Self> {
        let path = project_dir.join(DECLARATIONS_FILE_NAME);
        if !path.exists() {
            debug!("No {} found, no custom dependency declarations", DECLARATIONS_FILE_NAME);
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content, dependency_key)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse properties text, keeping keys under `<dependency_key>.`
    pub fn parse(content: &str, dependency_key: &str) -> KeeperResult<Self> {
        let prefix = format!("{}.", dependency_key);
        let mut entries = BTreeMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = split_property(line);
            let Some(name) = key.strip_prefix(&prefix) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            let ty = if value.is_empty() {
                DependencyType::Release
            } else {
                value.parse::<DependencyType>()?
            };
            debug!("custom dependency: {} -> {}", name, ty);
            entries.insert(name.to_string(), ty);
        }

        Ok(Self { entries })
    }

    /// Declare a type for an artifact
    pub fn declare(mut self, name: impl Into<String>, ty: DependencyType) -> Self {
        self.entries.insert(name.into(), ty);
        self
    }

    /// Declared type for an artifact, if any
    pub fn get(&self, name: &str) -> Option<DependencyType> {
        self.entries.get(name).copied()
    }

    /// Declarations in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, DependencyType)> {
        self.entries.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Artifact names grouped by declared type
    pub fn group_by_type(&self) -> BTreeMap<DependencyType, Vec<String>> {
        let mut groups: BTreeMap<DependencyType, Vec<String>> = BTreeMap::new();
        for (name, ty) in &self.entries {
            groups.entry(*ty).or_default().push(name.clone());
        }
        groups
    }
}

/// Split `key=value` or `key:value`; the first separator wins.
fn split_property(line: &str) -> (&str, &str) {
    match line.find(['=', ':']) {
        Some(idx) => (line[..idx].trim(), line[idx + 1..].trim()),
        None => (line, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeeperError;

    #[test]
    fn parses_declarations_under_key() {
        let content = r#"
# local checkout preferences
sdk.dir=/opt/android-sdk
dependency.network=source
dependency.imageloader = SNAPSHOT
! legacy comment
dependency.analytics=
"#;
        let declarations = DependencyDeclarations::parse(content, "dependency").unwrap();

        assert_eq!(declarations.len(), 3);
        assert_eq!(declarations.get("network"), Some(DependencyType::Source));
        assert_eq!(declarations.get("imageloader"), Some(DependencyType::Snapshot));
        assert_eq!(declarations.get("analytics"), Some(DependencyType::Release));
        assert_eq!(declarations.get("sdk.dir"), None);
    }

    #[test]
    fn custom_key_is_honored() {
        let content = "dependency.network=source\nmodule.network=snapshot\n";
        let declarations = DependencyDeclarations::parse(content, "module").unwrap();
        assert_eq!(declarations.get("network"), Some(DependencyType::Snapshot));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = DependencyDeclarations::parse("dependency.network=git", "dependency")
            .unwrap_err();
        assert_eq!(err, KeeperError::InvalidDependencyType("git".into()));
    }

    #[test]
    fn groups_names_by_type() {
        let declarations = DependencyDeclarations::new()
            .declare("network", DependencyType::Source)
            .declare("storage", DependencyType::Source)
            .declare("imageloader", DependencyType::Snapshot);

        let groups = declarations.group_by_type();
        assert_eq!(
            groups.get(&DependencyType::Source),
            Some(&vec!["network".to_string(), "storage".to_string()])
        );
        assert_eq!(groups.get(&DependencyType::Release), None);
    }
}
