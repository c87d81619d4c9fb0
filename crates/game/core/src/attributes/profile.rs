//! Named bundles of starting attribute values.

use std::sync::Arc;

use super::definition::AttributeDef;
use super::store::AttributeStore;

/// One `(attribute, base value)` pair inside a profile.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileEntry {
    pub attribute: Arc<AttributeDef>,
    pub base_value: f32,
}

/// Seed values for an [`AttributeStore`], optionally inheriting from a parent.
///
/// Resolution order: the parent's resolved entries first, then this profile's
/// entries, each replacing any inherited entry for the same attribute.
/// Profiles have no role after seeding.
#[derive(Clone, Debug, Default)]
pub struct AttributeProfile {
    name: String,
    entries: Vec<ProfileEntry>,
    parent: Option<Arc<AttributeProfile>>,
}

impl AttributeProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: Arc<AttributeProfile>) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_value(mut self, attribute: Arc<AttributeDef>, base_value: f32) -> Self {
        self.set(attribute, base_value);
        self
    }

    /// Sets a value, replacing an earlier entry for the same attribute.
    pub fn set(&mut self, attribute: Arc<AttributeDef>, base_value: f32) {
        match self.entries.iter_mut().find(|e| e.attribute == attribute) {
            Some(entry) => entry.base_value = base_value,
            None => self.entries.push(ProfileEntry {
                attribute,
                base_value,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<AttributeProfile>> {
        self.parent.as_ref()
    }

    /// Entries declared directly on this profile.
    pub fn own_entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    /// Flattened entries with inheritance applied.
    pub fn resolve(&self) -> Vec<ProfileEntry> {
        let mut resolved = self
            .parent
            .as_ref()
            .map(|parent| parent.resolve())
            .unwrap_or_default();

        for entry in &self.entries {
            match resolved.iter_mut().find(|e| e.attribute == entry.attribute) {
                Some(existing) => existing.base_value = entry.base_value,
                None => resolved.push(entry.clone()),
            }
        }
        resolved
    }

    /// Writes every resolved entry into `store` as a base value.
    pub fn seed(&self, store: &mut AttributeStore) {
        for entry in self.resolve() {
            store.set_base(&entry.attribute, entry.base_value);
        }
    }
}
