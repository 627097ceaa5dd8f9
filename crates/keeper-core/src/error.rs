//! Error types for keeper
//!
//! Only usage errors and collaborator validation errors are represented here.
//! Cache storage failures are recovered inside the cache layer and never
//! surface as a `KeeperError`.

use thiserror::Error;

/// Result type alias for keeper operations
pub type KeeperResult<T> = Result<T, KeeperError>;

/// All errors that can abort a build
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeeperError {
    // Usage errors
    #[error("Root module has not been set. Register the root before activating modules")]
    RootNotSet,

    #[error("Dependency configuration has not been set at root scope")]
    DependencyConfigNotSet,

    #[error("Publish configuration has not been set at root scope")]
    PublishConfigNotSet,

    // Collaborator validation errors
    #[error("Invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    #[error("Invalid dependency type: {0}. Expected one of: source, snapshot, release")]
    InvalidDependencyType(String),

    #[error("Invalid {section} configuration: {reason}")]
    ConfigInvalid {
        section: &'static str,
        reason: String,
    },
}

impl KeeperError {
    /// Create an invalid identifier error
    pub fn invalid_identifier(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error for the given section
    pub fn config_invalid(section: &'static str, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            section,
            reason: reason.into(),
        }
    }

    /// Whether the error comes from reading coordination state before it was set
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::RootNotSet | Self::DependencyConfigNotSet | Self::PublishConfigNotSet
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = KeeperError::invalid_identifier("g:a", "expected group:artifact:version");
        assert_eq!(
            err.to_string(),
            "Invalid identifier 'g:a': expected group:artifact:version"
        );
    }

    #[test]
    fn usage_errors_are_classified() {
        assert!(KeeperError::RootNotSet.is_usage_error());
        assert!(KeeperError::PublishConfigNotSet.is_usage_error());
        assert!(!KeeperError::InvalidDependencyType("git".into()).is_usage_error());
    }
}
