//! Root-level configuration shared by every module of a build
//!
//! Two schemas are declared once at root scope:
//! - Dependency: version overrides, exclusions and conversion toggles
//! - Publish: repository targets, artifact naming and per-module opt-outs
//!
//! Both are read from the `[dependency]` and `[publish]` tables of
//! `keeper.toml` in the root project directory, or built in code by the host.

pub mod declarations;
pub mod parser;
pub mod registry;
pub mod schema;

pub use declarations::DependencyDeclarations;
pub use parser::{load_root_config, parse_keeper_toml, parse_keeper_toml_str, to_toml};
pub use registry::ConfigRegistry;
pub use schema::{DependencyConfig, DependencyConventions, KeeperConfig, PublishConfig};

/// File name of the root configuration
pub const CONFIG_FILE_NAME: &str = "keeper.toml";
