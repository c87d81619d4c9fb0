//! Per-entity attribute values.
//!
//! Each slot stores a base value and a current value. The current value is
//! kept within the attribute's effective bounds:
//!
//! ```text
//! effective max = live value of the linked cap attribute
//!               | static max_value
//!               | unbounded
//! effective min = static min_value | unbounded
//! ```
//!
//! Writing a cap attribute pulls the stored values it caps back under the new
//! limit, and [`AttributeStore::get`] re-applies the live bounds on every read
//! (covering caps that only exist as definition defaults).

use std::sync::Arc;

use tracing::trace;

use super::definition::AttributeDef;
use crate::config::EngineConfig;

/// Cap links followed before a cap attribute is read unclamped.
const MAX_CAP_DEPTH: usize = 8;

/// A recorded change of an attribute's current value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeChange {
    pub attribute: String,
    pub old_value: f32,
    pub new_value: f32,
}

/// Read-only view of one stored attribute.
#[derive(Clone, Copy, Debug)]
pub struct AttributeValue<'a> {
    pub definition: &'a Arc<AttributeDef>,
    pub base: f32,
    pub current: f32,
}

#[derive(Clone, Debug)]
struct AttributeSlot {
    def: Arc<AttributeDef>,
    base: f32,
    current: f32,
}

/// Base/current values for one entity, plus a queue of pending change notifications.
#[derive(Clone, Debug, Default)]
pub struct AttributeStore {
    slots: Vec<AttributeSlot>,
    changes: Vec<AttributeChange>,
    config: EngineConfig,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Identity match first, then case-insensitive id / display-name match.
    fn slot_index(&self, def: &AttributeDef) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.def.id() == def.id())
            .or_else(|| self.named_index(def.id()))
    }

    fn named_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.def.matches_name(name))
    }

    /// True if the entity has a slot for this attribute, as opposed to
    /// falling back to the definition default.
    pub fn has(&self, def: &AttributeDef) -> bool {
        self.slot_index(def).is_some()
    }

    pub fn has_named(&self, name: &str) -> bool {
        self.named_index(name).is_some()
    }

    /// Resolves a name (id or display name, any case) to the stored definition.
    pub fn find(&self, name: &str) -> Option<&Arc<AttributeDef>> {
        self.named_index(name).map(|i| &self.slots[i].def)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current value clamped to the live bounds, or the definition default when unset.
    pub fn get(&self, def: &AttributeDef) -> f32 {
        self.get_at(def, 0)
    }

    fn get_at(&self, def: &AttributeDef, depth: usize) -> f32 {
        match self.slot_index(def) {
            Some(i) => self.clamp_at(&self.slots[i].def, self.slots[i].current, depth),
            None => def.default_value(),
        }
    }

    pub fn get_base(&self, def: &AttributeDef) -> f32 {
        self.slot_index(def)
            .map_or(def.default_value(), |i| self.slots[i].base)
    }

    /// Current value by name. Unknown names read as `0.0`.
    pub fn get_named(&self, name: &str) -> f32 {
        self.named_index(name)
            .map_or(0.0, |i| self.clamp(&self.slots[i].def, self.slots[i].current))
    }

    pub fn get_base_named(&self, name: &str) -> f32 {
        self.named_index(name).map_or(0.0, |i| self.slots[i].base)
    }

    /// Upper bound currently in force, `None` when unbounded.
    ///
    /// A cap naming the attribute itself is ignored. Past eight cap links the
    /// last cap's stored value is used without clamping it.
    pub fn effective_max(&self, def: &AttributeDef) -> Option<f32> {
        self.effective_max_at(def, 0)
    }

    fn effective_max_at(&self, def: &AttributeDef, depth: usize) -> Option<f32> {
        match def.max_attribute() {
            Some(cap) if cap.as_ref() == def => def.max_value(),
            Some(cap) if depth >= MAX_CAP_DEPTH => Some(
                self.slot_index(cap)
                    .map_or(cap.default_value(), |i| self.slots[i].current),
            ),
            Some(cap) => Some(self.get_at(cap, depth + 1)),
            None => def.max_value(),
        }
    }

    pub fn effective_min(&self, def: &AttributeDef) -> Option<f32> {
        def.min_value()
    }

    /// `get / effective_max`; `0.0` when the attribute is absent, unbounded,
    /// or its max is not positive.
    pub fn ratio(&self, def: &AttributeDef) -> f32 {
        if !self.has(def) {
            return 0.0;
        }
        match self.effective_max(def) {
            Some(max) if max > 0.0 => self.get(def) / max,
            _ => 0.0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = AttributeValue<'_>> + '_ {
        self.slots.iter().map(|slot| AttributeValue {
            definition: &slot.def,
            base: slot.base,
            current: slot.current,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Sets the base value and resets current to it (clamped). Creates the slot if absent.
    pub fn set_base(&mut self, def: &Arc<AttributeDef>, value: f32) {
        let idx = self.ensure_slot(def);
        let old = self.slots[idx].current;
        let clamped = self.clamp(&self.slots[idx].def, value);

        self.slots[idx].base = value;
        self.slots[idx].current = clamped;
        self.record(idx, old, clamped);
        self.reclamp_dependents(idx);
    }

    /// Sets the current value, clamped against the effective bounds.
    ///
    /// A change notification is queued only when the clamped value differs
    /// from the previous current value beyond float noise.
    pub fn set_current(&mut self, def: &Arc<AttributeDef>, value: f32) {
        let idx = self.ensure_slot(def);
        let old = self.slots[idx].current;
        let clamped = self.clamp(&self.slots[idx].def, value);

        self.slots[idx].current = clamped;
        self.record(idx, old, clamped);
        self.reclamp_dependents(idx);
    }

    /// `set_current(get() + delta)`.
    pub fn modify(&mut self, def: &Arc<AttributeDef>, delta: f32) {
        let value = self.get(def) + delta;
        self.set_current(def, value);
    }

    /// Adjusts the base value and resets current to it.
    ///
    /// Only the static bounds apply here; the linked cap attribute is ignored
    /// so that cap attributes themselves (MaxHealth) can be resized freely.
    pub fn modify_base(&mut self, def: &Arc<AttributeDef>, delta: f32) {
        let idx = self.ensure_slot(def);
        let old = self.slots[idx].current;
        let base = self.slots[idx].base + delta;
        let current = Self::clamp_static(&self.slots[idx].def, base);

        self.slots[idx].base = base;
        self.slots[idx].current = current;
        self.record(idx, old, current);
        self.reclamp_dependents(idx);
    }

    /// Drains queued change notifications in the order they happened.
    pub fn take_changes(&mut self) -> Vec<AttributeChange> {
        std::mem::take(&mut self.changes)
    }

    fn ensure_slot(&mut self, def: &Arc<AttributeDef>) -> usize {
        if let Some(idx) = self.slot_index(def) {
            return idx;
        }
        let default = def.default_value();
        self.slots.push(AttributeSlot {
            def: Arc::clone(def),
            base: default,
            current: default,
        });
        self.slots.len() - 1
    }

    /// Pulls stored values of attributes capped by `slots[idx]` back under the new cap.
    fn reclamp_dependents(&mut self, idx: usize) {
        let changed = Arc::clone(&self.slots[idx].def);
        for j in 0..self.slots.len() {
            let depends = j != idx
                && self.slots[j]
                    .def
                    .max_attribute()
                    .is_some_and(|cap| **cap == *changed);
            if !depends {
                continue;
            }

            let old = self.slots[j].current;
            let clamped = self.clamp(&self.slots[j].def, old);
            if clamped < old {
                self.slots[j].current = clamped;
                self.record(j, old, clamped);
                self.reclamp_dependents(j);
            }
        }
    }

    fn record(&mut self, idx: usize, old: f32, new: f32) {
        if self.config.approx_eq(old, new) {
            return;
        }
        let attribute = self.slots[idx].def.id().to_string();
        trace!(
            target: "gameplay::attributes",
            attribute = %attribute,
            old,
            new,
            "attribute changed"
        );
        self.changes.push(AttributeChange {
            attribute,
            old_value: old,
            new_value: new,
        });
    }

    fn clamp(&self, def: &AttributeDef, value: f32) -> f32 {
        self.clamp_at(def, value, 0)
    }

    fn clamp_at(&self, def: &AttributeDef, value: f32, depth: usize) -> f32 {
        let mut value = value;
        if let Some(max) = self.effective_max_at(def, depth) {
            value = value.min(max);
        }
        if let Some(min) = self.effective_min(def) {
            value = value.max(min);
        }
        value
    }

    fn clamp_static(def: &AttributeDef, value: f32) -> f32 {
        let mut value = value;
        if let Some(max) = def.max_value() {
            value = value.min(max);
        }
        if let Some(min) = def.min_value() {
            value = value.max(min);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health_pair() -> (Arc<AttributeDef>, Arc<AttributeDef>) {
        let max_health = AttributeDef::new("MaxHealth")
            .with_display_name("Max Health")
            .with_default(100.0)
            .build();
        let health = AttributeDef::new("Health")
            .with_min(0.0)
            .with_max_attribute(Arc::clone(&max_health))
            .build();
        (health, max_health)
    }

    #[test]
    fn unset_attribute_reads_default() {
        let (_, max_health) = health_pair();
        let store = AttributeStore::new();
        assert_eq!(store.get(&max_health), 100.0);
        assert_eq!(store.get_base(&max_health), 100.0);
        assert!(!store.has(&max_health));
        assert_eq!(store.get_named("MaxHealth"), 0.0);
    }

    #[test]
    fn modify_clamps_to_min() {
        let (health, _) = health_pair();
        let mut store = AttributeStore::new();
        store.set_base(&health, 100.0);

        store.modify(&health, -150.0);

        assert_eq!(store.get(&health), 0.0);
    }

    #[test]
    fn linked_cap_is_live() {
        let (health, max_health) = health_pair();
        let mut store = AttributeStore::new();
        store.set_base(&max_health, 100.0);
        store.set_base(&health, 100.0);

        store.set_current(&health, 250.0);
        assert_eq!(store.get(&health), 100.0);

        // Shrinking the cap is reflected without touching Health.
        store.set_base(&max_health, 60.0);
        assert_eq!(store.get(&health), 60.0);
        assert_eq!(store.ratio(&health), 1.0);

        // Growing the cap doesn't inflate Health back.
        store.modify_base(&max_health, 90.0);
        assert_eq!(store.get(&max_health), 150.0);
        assert_eq!(store.get(&health), 60.0);
        assert!((store.ratio(&health) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn static_bounds_apply_without_cap() {
        let armor = AttributeDef::new("Armor").with_min(0.0).with_max(50.0).build();
        let mut store = AttributeStore::new();

        store.set_base(&armor, 80.0);
        assert_eq!(store.get(&armor), 50.0);
        assert_eq!(store.get_base(&armor), 80.0);

        store.modify_base(&armor, -200.0);
        assert_eq!(store.get(&armor), 0.0);
    }

    #[test]
    fn modify_base_bypasses_linked_cap() {
        let (health, max_health) = health_pair();
        let mut store = AttributeStore::new();
        store.set_base(&max_health, 100.0);
        store.set_base(&health, 100.0);

        store.modify_base(&health, 50.0);

        assert_eq!(store.get_base(&health), 150.0);
        // Reads still observe the live cap.
        assert_eq!(store.get(&health), 100.0);
    }

    #[test]
    fn change_notifications_skip_float_noise() {
        let mana = AttributeDef::new("Mana").build();
        let mut store = AttributeStore::new();

        store.set_base(&mana, 0.3);
        store.take_changes();

        store.set_current(&mana, 0.1 + 0.2);
        assert!(store.take_changes().is_empty());

        store.modify(&mana, 1.0);
        let changes = store.take_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].attribute, "Mana");
        assert!((changes[0].new_value - 1.3).abs() < 1e-6);
    }

    #[test]
    fn lookup_by_name_is_case_insensitive() {
        let (health, max_health) = health_pair();
        let mut store = AttributeStore::new();
        store.set_base(&max_health, 120.0);
        store.set_base(&health, 80.0);

        assert_eq!(store.get_named("max health"), 120.0);
        assert_eq!(store.get_named("HEALTH"), 80.0);
        assert!(store.has_named("maxhealth"));
        assert_eq!(store.find("Max Health").map(|d| d.id()), Some("MaxHealth"));
        assert_eq!(store.get_named("stamina"), 0.0);
    }

    #[test]
    fn separately_built_definitions_share_identity() {
        let mut store = AttributeStore::new();
        let original = AttributeDef::new("Stamina").build();
        store.set_base(&original, 40.0);

        let alias = AttributeDef::new("stamina").with_default(5.0);
        assert!(store.has(&alias));
        assert_eq!(store.get(&alias), 40.0);
    }

    #[test]
    fn ratio_is_zero_when_absent_or_unbounded() {
        let (health, _) = health_pair();
        let gold = AttributeDef::new("Gold").build();
        let mut store = AttributeStore::new();

        assert_eq!(store.ratio(&health), 0.0);
        store.set_base(&gold, 10.0);
        assert_eq!(store.ratio(&gold), 0.0);
    }
    #[test]
    fn self_cap_by_id_falls_back_to_static_bounds() {
        let looped = AttributeDef::new("X")
            .with_max(30.0)
            .with_max_attribute(AttributeDef::new("x").build())
            .build();
        let mut store = AttributeStore::new();

        store.set_current(&looped, 50.0);
        assert_eq!(store.get(&looped), 30.0);
        assert_eq!(store.effective_max(&looped), Some(30.0));
    }

    #[test]
    fn mutual_caps_terminate() {
        let ward = AttributeDef::new("Ward")
            .with_default(100.0)
            .with_max_attribute(AttributeDef::new("Shell").with_default(100.0).build())
            .build();
        let shell = AttributeDef::new("Shell")
            .with_default(100.0)
            .with_max_attribute(AttributeDef::new("Ward").with_default(100.0).build())
            .build();
        let mut store = AttributeStore::new();

        store.set_base(&shell, 20.0);
        store.set_base(&ward, 50.0);
        assert_eq!(store.get(&ward), 20.0);
        assert_eq!(store.get(&shell), 20.0);
    }
}
