//! Content loaders for reading gameplay data from files.
//!
//! Catalogs are RON; engine tuning is TOML. Loaders only parse; cross
//! references are resolved by [`ContentDatabase`](crate::ContentDatabase).

pub mod catalog;
pub mod config;
pub mod factory;

pub use catalog::{AbilityLoader, AttributeLoader, EffectLoader, ProfileLoader, TagLoader};
pub use config::ConfigLoader;
pub use factory::ContentFactory;

use std::path::Path;

use serde::de::DeserializeOwned;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Reads and parses a RON file, naming `what` in the error.
pub(crate) fn read_ron<T: DeserializeOwned>(path: &Path, what: &str) -> LoadResult<T> {
    let content = read_file(path)?;
    ron::from_str(&content).map_err(|e| {
        anyhow::anyhow!("Failed to parse {} RON at {}: {}", what, path.display(), e)
    })
}
