//! Shared core types used across configuration, cache and collaborator layers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{KeeperError, KeeperResult};

/// Path of the root module in `:a:b` notation.
pub const ROOT_PATH: &str = ":";

/// Placeholder version hosts report for modules without an explicit version.
pub const UNSPECIFIED_VERSION: &str = "unspecified";

/// Suffix marking a snapshot version.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Reference to a buildable module as enumerated by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleRef {
    path: String,
    name: String,
    project_dir: PathBuf,
    build_dir: PathBuf,
}

impl ModuleRef {
    /// Create the root module reference. Its build output lives in `<project_dir>/build`.
    pub fn root(name: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        Self {
            path: ROOT_PATH.to_string(),
            name: name.into(),
            build_dir: project_dir.join("build"),
            project_dir,
        }
    }

    /// Create a module reference from its `:a:b` path.
    ///
    /// The name is the last path segment.
    pub fn new(path: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let project_dir = project_dir.into();
        let name = path.rsplit(':').next().unwrap_or_default().to_string();
        Self {
            path,
            name,
            build_dir: project_dir.join("build"),
            project_dir,
        }
    }

    /// Override the build output directory.
    pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
        self.build_dir = build_dir.into();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn is_root(&self) -> bool {
        self.path == ROOT_PATH
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// How a declared dependency should be consumed
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    /// Substitute the published artifact with the local module
    Source,
    /// Consume the snapshot build of the artifact
    Snapshot,
    /// Consume the released artifact
    #[default]
    Release,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Snapshot => "snapshot",
            Self::Release => "release",
        }
    }

    /// All types in declaration order
    pub fn all() -> &'static [Self] {
        &[Self::Source, Self::Snapshot, Self::Release]
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = KeeperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| KeeperError::InvalidDependencyType(trimmed.to_string()))
    }
}

/// Fully-qualified `group:artifact:version` coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinate {
    /// Build a coordinate, rejecting empty segments and unspecified versions.
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> KeeperResult<Self> {
        let coordinate = Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Parse `group:artifact:version`.
    pub fn parse(identifier: &str) -> KeeperResult<Self> {
        let parts: Vec<&str> = identifier.split(':').collect();
        let [group, artifact, version] = parts.as_slice() else {
            return Err(KeeperError::invalid_identifier(
                identifier,
                "expected group:artifact:version",
            ));
        };
        Self::new(*group, *artifact, *version)
    }

    fn validate(&self) -> KeeperResult<()> {
        let identifier = self.to_string();
        if self.group.is_empty() || self.artifact.is_empty() || self.version.is_empty() {
            return Err(KeeperError::invalid_identifier(
                identifier,
                "group, artifact and version must be non-empty",
            ));
        }
        if self.version == UNSPECIFIED_VERSION {
            return Err(KeeperError::invalid_identifier(
                identifier,
                "version is unspecified",
            ));
        }
        Ok(())
    }

    /// `group:artifact` without the version
    pub fn module_id(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    pub fn is_snapshot(&self) -> bool {
        self.version
            .to_ascii_uppercase()
            .ends_with(SNAPSHOT_SUFFIX)
    }

    /// The same coordinate with a `-SNAPSHOT` version. Already-snapshot versions are kept.
    pub fn to_snapshot(&self) -> Self {
        if self.is_snapshot() {
            return self.clone();
        }
        Self {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            version: format!("{}{}", self.version, SNAPSHOT_SUFFIX),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl FromStr for Coordinate {
    type Err = KeeperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Separator between a substituted module id and its local module path
const LOCAL_MARKER: &str = " -> project(";

/// A dependency produced by conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// Artifact resolved from a repository
    External(Coordinate),
    /// Published artifact replaced by a module of this build
    Local {
        /// `group:artifact` being substituted
        module_id: String,
        /// Path of the module building it
        module_path: String,
    },
}

impl Dependency {
    pub fn local(module_id: impl Into<String>, module_path: impl Into<String>) -> Self {
        Self::Local {
            module_id: module_id.into(),
            module_path: module_path.into(),
        }
    }

    /// `group:artifact` of the dependency
    pub fn module_id(&self) -> String {
        match self {
            Self::External(coordinate) => coordinate.module_id(),
            Self::Local { module_id, .. } => module_id.clone(),
        }
    }

    /// Repository coordinate, `None` for local substitutions
    pub fn coordinate(&self) -> Option<&Coordinate> {
        match self {
            Self::External(coordinate) => Some(coordinate),
            Self::Local { .. } => None,
        }
    }

    /// Module path substituting the artifact, if any
    pub fn local_path(&self) -> Option<&str> {
        match self {
            Self::External(_) => None,
            Self::Local { module_path, .. } => Some(module_path),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }

    /// Parse the form written by `Display`.
    pub fn parse(value: &str) -> KeeperResult<Self> {
        let Some((module_id, rest)) = value.split_once(LOCAL_MARKER) else {
            return Coordinate::parse(value).map(Self::External);
        };
        match rest.strip_suffix(')') {
            Some(module_path) if module_id.contains(':') && module_path.starts_with(':') => {
                Ok(Self::local(module_id, module_path))
            }
            _ => Err(KeeperError::invalid_identifier(
                value,
                "expected group:artifact -> project(:path)",
            )),
        }
    }
}

impl From<Coordinate> for Dependency {
    fn from(coordinate: Coordinate) -> Self {
        Self::External(coordinate)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External(coordinate) => fmt::Display::fmt(coordinate, f),
            Self::Local {
                module_id,
                module_path,
            } => write!(f, "{}{}{})", module_id, LOCAL_MARKER, module_path),
        }
    }
}

impl FromStr for Dependency {
    type Err = KeeperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
