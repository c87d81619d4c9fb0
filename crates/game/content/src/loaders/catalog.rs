//! RON catalog loaders.
//!
//! Each catalog file wraps its list in a named struct:
//!
//! ```ron
//! (effects: [
//!     (name: "Stun", duration: 2.0, grant_tags: ["State.Stunned"]),
//! ])
//! ```

use std::path::Path;

use crate::loaders::{LoadResult, read_ron};
use crate::specs::{
    AbilityCatalog, AbilitySpec, AttributeCatalog, AttributeSpec, EffectCatalog, EffectSpec,
    ProfileCatalog, ProfileSpec, TagCatalog,
};

/// Loader for the tag path list.
pub struct TagLoader;

impl TagLoader {
    pub fn load(path: &Path) -> LoadResult<TagCatalog> {
        read_ron(path, "tag catalog")
    }
}

/// Loader for attribute definitions.
pub struct AttributeLoader;

impl AttributeLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<AttributeSpec>> {
        let catalog: AttributeCatalog = read_ron(path, "attribute catalog")?;
        Ok(catalog.attributes)
    }
}

/// Loader for attribute profiles.
pub struct ProfileLoader;

impl ProfileLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<ProfileSpec>> {
        let catalog: ProfileCatalog = read_ron(path, "profile catalog")?;
        Ok(catalog.profiles)
    }
}

/// Loader for effect definitions.
pub struct EffectLoader;

impl EffectLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<EffectSpec>> {
        let catalog: EffectCatalog = read_ron(path, "effect catalog")?;
        Ok(catalog.effects)
    }
}

/// Loader for ability definitions.
pub struct AbilityLoader;

impl AbilityLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<AbilitySpec>> {
        let catalog: AbilityCatalog = read_ron(path, "ability catalog")?;
        Ok(catalog.abilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameplay_core::{AbilityKind, ModifierOp, TagQueryExpr};
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn effect_catalog_defaults_optional_fields() {
        let file = write_temp(
            r#"(effects: [
                (name: "Stun", duration: 2.0, grant_tags: ["State.Stunned"]),
                (
                    name: "Poison",
                    duration: 5.0,
                    period: Some(1.0),
                    modifiers: [(attribute: "Health", op: Add, value: -4.0)],
                    block_tags: Some(Tag("State.Immune")),
                ),
            ])"#,
        );

        let effects = EffectLoader::load(file.path()).unwrap();

        assert_eq!(effects.len(), 2);
        assert!(effects[0].modifiers.is_empty());
        assert_eq!(effects[0].max_stacks, None);
        assert_eq!(effects[1].modifiers[0].op, ModifierOp::Add);
        assert_eq!(
            effects[1].block_tags,
            Some(TagQueryExpr::Tag("State.Immune".into()))
        );
    }

    #[test]
    fn ability_kinds_parse() {
        let file = write_temp(
            r#"(abilities: [
                (name: "Dash", kind: Some(Dash(speed: 20.0, duration: 0.2))),
                (name: "Grapple", kind: Some(Custom(behavior: "grapple"))),
                (name: "Jab"),
            ])"#,
        );

        let abilities = AbilityLoader::load(file.path()).unwrap();

        assert_eq!(
            abilities[0].kind,
            Some(AbilityKind::Dash {
                speed: 20.0,
                duration: 0.2
            })
        );
        assert_eq!(
            abilities[1].kind.as_ref().and_then(AbilityKind::custom_name),
            Some("grapple")
        );
        assert_eq!(abilities[2].kind, None);
    }

    #[test]
    fn malformed_file_names_the_catalog() {
        let file = write_temp("(tags: [");
        let err = TagLoader::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("tag catalog"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ProfileLoader::load(Path::new("/nonexistent/profiles.ron")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
