//! Per-entity tag ownership.

use super::registry::{TagId, TagRegistry};

/// The set of tags owned by one entity.
///
/// Ids are kept in insertion order, but order carries no meaning.
/// Hierarchical queries need the [`TagRegistry`] that issued the ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagSet {
    ids: Vec<TagId>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag. Returns `false` if it was already owned.
    pub fn add(&mut self, id: TagId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Removes a tag. Returns `false` if it wasn't owned.
    pub fn remove(&mut self, id: TagId) -> bool {
        match self.ids.iter().position(|owned| *owned == id) {
            Some(idx) => {
                self.ids.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Exact membership, no hierarchy.
    #[inline]
    pub fn has_exact(&self, id: TagId) -> bool {
        self.ids.contains(&id)
    }

    /// Hierarchical membership: owned exactly, or some owned tag descends from `id`.
    ///
    /// A set holding `State.Stunned` answers true for `State`.
    pub fn has(&self, id: TagId, registry: &TagRegistry) -> bool {
        self.ids
            .iter()
            .any(|&owned| owned == id || registry.is_descendant(owned, id))
    }

    pub fn has_any_exact(&self, other: &TagSet) -> bool {
        other.ids.iter().any(|&id| self.has_exact(id))
    }

    pub fn has_all_exact(&self, other: &TagSet) -> bool {
        other.ids.iter().all(|&id| self.has_exact(id))
    }

    pub fn has_any(&self, other: &TagSet, registry: &TagRegistry) -> bool {
        other.ids.iter().any(|&id| self.has(id, registry))
    }

    pub fn has_all(&self, other: &TagSet, registry: &TagRegistry) -> bool {
        other.ids.iter().all(|&id| self.has(id, registry))
    }

    pub fn iter(&self) -> impl Iterator<Item = TagId> + '_ {
        self.ids.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl FromIterator<TagId> for TagSet {
    fn from_iter<I: IntoIterator<Item = TagId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.add(id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TagRegistry, TagId, TagId, TagId) {
        let registry =
            TagRegistry::from_paths(["State", "State.Stunned", "Ability.Dash"]).unwrap();
        let state = registry.id_of("State").unwrap();
        let stunned = registry.id_of("State.Stunned").unwrap();
        let dash = registry.id_of("Ability.Dash").unwrap();
        (registry, state, stunned, dash)
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let (_, state, _, _) = setup();
        let mut set = TagSet::new();

        assert!(set.add(state));
        assert!(!set.add(state));
        assert_eq!(set.len(), 1);

        assert!(set.remove(state));
        assert!(!set.remove(state));
        assert!(set.is_empty());
    }

    #[test]
    fn hierarchical_membership() {
        let (registry, state, stunned, dash) = setup();
        let set: TagSet = [stunned].into_iter().collect();

        assert!(set.has(state, &registry));
        assert!(!set.has_exact(state));
        assert!(set.has(stunned, &registry));
        assert!(set.has_exact(stunned));
        assert!(!set.has(dash, &registry));
    }

    #[test]
    fn child_query_does_not_match_parent_ownership() {
        let (registry, state, stunned, _) = setup();
        let set: TagSet = [state].into_iter().collect();
        assert!(!set.has(stunned, &registry));
    }

    #[test]
    fn set_against_set_queries() {
        let (registry, state, stunned, dash) = setup();
        let owned: TagSet = [stunned, dash].into_iter().collect();
        let wanted: TagSet = [state, dash].into_iter().collect();

        assert!(owned.has_all(&wanted, &registry));
        assert!(!owned.has_all_exact(&wanted));
        assert!(owned.has_any_exact(&wanted));

        let none: TagSet = [state].into_iter().collect();
        assert!(!owned.has_any_exact(&none));
        assert!(owned.has_any(&none, &registry));
        assert!(owned.has_all(&TagSet::new(), &registry));
    }
}
