//! Data-driven gameplay content: specs, resolution and loaders.
//!
//! This crate houses author-time definitions and provides loaders for RON/TOML
//! data files:
//! - Tag catalogs (hierarchical paths)
//! - Attribute definitions and profiles (with parent inheritance)
//! - Effect and ability definitions
//! - Engine configuration (TOML)
//!
//! Specs name each other by string; [`ContentDatabase`] validates every
//! reference once at load time and hands out shared core definitions.

pub mod database;
pub mod specs;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use database::{ContentDatabase, ContentError, ContentResult};
pub use specs::{
    AbilityCatalog, AbilitySpec, AttributeCatalog, AttributeSpec, ContentSpecs, CooldownSpec,
    CostSpec, EffectCatalog, EffectSpec, ModifierSpec, ProfileCatalog, ProfileSpec, TagCatalog,
};

#[cfg(feature = "loaders")]
pub use loaders::{
    AbilityLoader, AttributeLoader, ConfigLoader, ContentFactory, EffectLoader, ProfileLoader,
    TagLoader,
};
