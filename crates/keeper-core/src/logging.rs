//! Diagnostic output setup for hosts that do not install a subscriber.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "keeper_core=debug,info";

/// Install a `tracing` subscriber writing formatted events to stderr.
///
/// Honors `RUST_LOG`; falls back to [`DEFAULT_FILTER`]. Returns `false` when a
/// global subscriber was already installed, in which case nothing changes.
pub fn init_tracing() -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
