mod duel;
mod inspect;

pub use duel::Duel;
pub use inspect::Inspect;

use std::path::PathBuf;

use anyhow::Result;
use gameplay_content::{ContentDatabase, ContentFactory};

/// Content bundled with the content crate.
pub fn default_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../game/content/data")
}

/// Loads the database from `dir`, or the bundled content when `None`.
pub fn load_content(dir: Option<PathBuf>) -> Result<ContentDatabase> {
    let dir = dir.unwrap_or_else(default_data_dir);
    tracing::info!(path = %dir.display(), "loading content");
    ContentFactory::new(dir).load_database()
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// JSON output
    Json,
}
