//! Build-scoped key/value cache
//!
//! Entries live in memory for the duration of one build and are flushed to a
//! JSON file under the root module's build directory. Every key persists across
//! builds except the transient publishing marker, which the coordinator clears
//! when the build finishes.

pub mod keys;
pub mod store;

pub use keys::CacheKey;
pub use store::{CACHE_FILE_NAME, CACHE_FORMAT_VERSION, CacheStore};

use std::collections::BTreeMap;

/// In-memory cache contents, ordered so the persisted file is stable
pub type CacheEntries = BTreeMap<String, String>;
