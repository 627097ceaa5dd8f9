//! Keeper Core Library
//!
//! Build-scoped coordination state shared by every module of a multi-module
//! build: root-level dependency and publish configuration, a key/value cache
//! that persists between build invocations, and the cleanup step that runs
//! when the build completes.

pub mod activator;
pub mod cache;
pub mod config;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod publish;
pub mod session;
pub mod types;

pub use error::{KeeperError, KeeperResult};

/// Re-exports of commonly used types
pub mod prelude {
    // Coordination
    pub use crate::coordinator::{Coordinator, FinalizeOutcome};
    pub use crate::session::BuildSession;

    // Activation
    pub use crate::activator::{
        ActivationReport, DependencyConverter, ModuleActivator, PublishConvention,
    };

    // Cache
    pub use crate::cache::{CacheKey, CacheStore};

    // Configuration
    pub use crate::config::{
        ConfigRegistry, DependencyConfig, DependencyConventions, DependencyDeclarations,
        KeeperConfig, PublishConfig,
    };

    // Collaborators
    pub use crate::convert::ShorthandConverter;
    pub use crate::publish::{Publication, PublishPlan, PublishPlanner};

    // Shared types
    pub use crate::types::{Coordinate, Dependency, DependencyType, ModuleRef};

    pub use crate::error::{KeeperError, KeeperResult};
}
