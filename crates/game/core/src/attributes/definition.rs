//! Attribute identity and clamp rules.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Static description of a numeric attribute (Health, Mana, MaxHealth, ...).
///
/// Identity is the `id` string compared case-insensitively; two definitions
/// with the same id are the same attribute even if built separately.
///
/// Bounds:
/// - `min_value`: static lower bound
/// - `max_value`: static upper bound, used only when no cap attribute is linked
/// - `max_attribute`: another attribute whose live value is the upper bound
#[derive(Clone, Debug)]
pub struct AttributeDef {
    id: String,
    display_name: String,
    default_value: f32,
    min_value: Option<f32>,
    max_value: Option<f32>,
    max_attribute: Option<Arc<AttributeDef>>,
}

impl AttributeDef {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            default_value: 0.0,
            min_value: None,
            max_value: None,
            max_attribute: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: f32) -> Self {
        self.default_value = value;
        self
    }

    #[must_use]
    pub fn with_min(mut self, min: f32) -> Self {
        self.min_value = Some(min);
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: f32) -> Self {
        self.max_value = Some(max);
        self
    }

    /// Caps this attribute by the live value of `cap` (e.g. Health by MaxHealth).
    #[must_use]
    pub fn with_max_attribute(mut self, cap: Arc<AttributeDef>) -> Self {
        self.max_attribute = Some(cap);
        self
    }

    /// Finishes the builder into the shared handle used everywhere else.
    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    pub fn min_value(&self) -> Option<f32> {
        self.min_value
    }

    pub fn max_value(&self) -> Option<f32> {
        self.max_value
    }

    pub fn max_attribute(&self) -> Option<&Arc<AttributeDef>> {
        self.max_attribute.as_ref()
    }

    /// Case-insensitive match against either the machine id or the display name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.id.eq_ignore_ascii_case(name) || self.display_name.eq_ignore_ascii_case(name)
    }
}

impl PartialEq for AttributeDef {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id)
    }
}

impl Eq for AttributeDef {}

impl Hash for AttributeDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.id.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_case_insensitive_id() {
        let a = AttributeDef::new("Health").with_default(100.0);
        let b = AttributeDef::new("health").with_display_name("Hit Points");
        let c = AttributeDef::new("Mana");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn name_matching_covers_id_and_display_name() {
        let def = AttributeDef::new("max_health").with_display_name("Max Health");
        assert!(def.matches_name("MAX_HEALTH"));
        assert!(def.matches_name("max health"));
        assert!(!def.matches_name("health"));
    }
}
