//! Content factory for building a database from a data directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use gameplay_core::EngineConfig;

use crate::ContentDatabase;
use crate::loaders::{
    AbilityLoader, AttributeLoader, ConfigLoader, EffectLoader, LoadResult, ProfileLoader,
    TagLoader,
};
use crate::specs::{AbilityCatalog, AttributeCatalog, ContentSpecs, EffectCatalog, ProfileCatalog};

/// Content factory that loads all gameplay content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml      (optional)
/// ├── tags.ron
/// ├── attributes.ron
/// ├── profiles.ron
/// ├── effects.ron
/// └── abilities.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`, or defaults if absent.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(
                target: "gameplay::content",
                path = %path.display(),
                "no config file, using defaults"
            );
            return Ok(EngineConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load every catalog without resolving references.
    pub fn load_specs(&self) -> LoadResult<ContentSpecs> {
        Ok(ContentSpecs {
            tags: TagLoader::load(&self.data_dir.join("tags.ron"))?,
            attributes: AttributeCatalog {
                attributes: AttributeLoader::load(&self.data_dir.join("attributes.ron"))?,
            },
            profiles: ProfileCatalog {
                profiles: ProfileLoader::load(&self.data_dir.join("profiles.ron"))?,
            },
            effects: EffectCatalog {
                effects: EffectLoader::load(&self.data_dir.join("effects.ron"))?,
            },
            abilities: AbilityCatalog {
                abilities: AbilityLoader::load(&self.data_dir.join("abilities.ron"))?,
            },
        })
    }

    /// Load and resolve every catalog.
    pub fn load_database(&self) -> LoadResult<ContentDatabase> {
        let specs = self.load_specs()?;
        ContentDatabase::build(&specs)
            .with_context(|| format!("Invalid content in {}", self.data_dir.display()))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), EngineConfig::default());
    }
}
