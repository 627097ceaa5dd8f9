//! Known cache keys and their persisted string form.

use std::fmt;

const PUBLISHING_PROJECT: &str = "publishingProject";
const PUBLISH_DONE_PREFIX: &str = "publishing:done:";
const PUBLISH_TARGET_PREFIX: &str = "publishing:target:";
const CONVERSION_PREFIX: &str = "conversion:";
const CHECKSUM_EXTENSIONS: &[&str] = &["pom", "aar", "jar"];

/// Typed view over the cache vocabulary.
///
/// The persisted file stores plain strings; [`CacheKey::parse`] and
/// [`fmt::Display`] convert between the two forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Path of the module publishing during this build. Cleared at build completion.
    PublishingProject,
    /// Marks a module as published in this or an earlier build
    PublishDone(String),
    /// Coordinate a module publishes as
    PublishTarget(String),
    /// Memoized shorthand conversion, scoped to a dependency config fingerprint
    Conversion {
        fingerprint: String,
        shorthand: String,
    },
    /// Remote checksum of an artifact file (`<identifier>.<extension>`)
    Checksum {
        identifier: String,
        extension: String,
    },
    /// Any key outside the known vocabulary
    Raw(String),
}

impl CacheKey {
    pub fn publish_done(module_path: impl Into<String>) -> Self {
        Self::PublishDone(module_path.into())
    }

    pub fn publish_target(module_path: impl Into<String>) -> Self {
        Self::PublishTarget(module_path.into())
    }

    pub fn conversion(fingerprint: impl Into<String>, shorthand: impl Into<String>) -> Self {
        Self::Conversion {
            fingerprint: fingerprint.into(),
            shorthand: shorthand.into(),
        }
    }

    pub fn checksum(identifier: impl Into<String>, extension: impl Into<String>) -> Self {
        Self::Checksum {
            identifier: identifier.into(),
            extension: extension.into(),
        }
    }

    /// Recover the typed key from its persisted form
    pub fn parse(key: &str) -> Self {
        if key == PUBLISHING_PROJECT {
            return Self::PublishingProject;
        }
        if let Some(module) = key.strip_prefix(PUBLISH_DONE_PREFIX) {
            return Self::PublishDone(module.to_string());
        }
        if let Some(module) = key.strip_prefix(PUBLISH_TARGET_PREFIX) {
            return Self::PublishTarget(module.to_string());
        }
        if let Some((fingerprint, shorthand)) = key
            .strip_prefix(CONVERSION_PREFIX)
            .and_then(|rest| rest.split_once(':'))
        {
            return Self::conversion(fingerprint, shorthand);
        }
        if let Some((identifier, extension)) = key.rsplit_once('.')
            && identifier.contains(':')
            && CHECKSUM_EXTENSIONS.contains(&extension)
        {
            return Self::checksum(identifier, extension);
        }
        Self::Raw(key.to_string())
    }

    /// Transient keys are dropped by [`Coordinator::finalize`](crate::coordinator::Coordinator::finalize)
    /// and never reach a later build
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::PublishingProject)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublishingProject => f.write_str(PUBLISHING_PROJECT),
            Self::PublishDone(module) => write!(f, "{}{}", PUBLISH_DONE_PREFIX, module),
            Self::PublishTarget(module) => write!(f, "{}{}", PUBLISH_TARGET_PREFIX, module),
            Self::Conversion {
                fingerprint,
                shorthand,
            } => write!(f, "{}{}:{}", CONVERSION_PREFIX, fingerprint, shorthand),
            Self::Checksum {
                identifier,
                extension,
            } => write!(f, "{}.{}", identifier, extension),
            Self::Raw(key) => f.write_str(key),
        }
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self::parse(key)
    }
}
