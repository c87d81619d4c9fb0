//! Registry of custom ability behaviors.

use std::collections::HashMap;
use std::sync::Arc;

use gameplay_core::{AbilityBehavior, AbilityDef};
use tracing::debug;

use super::{BehaviorFactory, BlinkFactory, GrappleFactory};

/// Name → factory table for `Custom` ability kinds.
#[derive(Clone, Default)]
pub struct BehaviorRegistry {
    lookup_table: HashMap<&'static str, Arc<dyn BehaviorFactory>>,
}

impl BehaviorRegistry {
    /// Creates a registry from a list of factories. Later entries win on name clashes.
    pub fn new(factories: Vec<Arc<dyn BehaviorFactory>>) -> Self {
        let lookup_table = factories
            .into_iter()
            .map(|factory| (factory.name(), factory))
            .collect();
        Self { lookup_table }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry with the stock movement behaviors (`blink`, `grapple`).
    pub fn default_behaviors() -> Self {
        Self::new(vec![
            Arc::new(BlinkFactory::default()) as Arc<dyn BehaviorFactory>,
            Arc::new(GrappleFactory::default()) as Arc<dyn BehaviorFactory>,
        ])
    }

    /// Adds or replaces a factory. Returns the replaced one.
    pub fn register(
        &mut self,
        factory: Arc<dyn BehaviorFactory>,
    ) -> Option<Arc<dyn BehaviorFactory>> {
        debug!(
            target: "runtime::behaviors",
            behavior = factory.name(),
            "behavior registered"
        );
        self.lookup_table.insert(factory.name(), factory)
    }

    pub fn find(&self, name: &str) -> Option<&Arc<dyn BehaviorFactory>> {
        self.lookup_table.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup_table.contains_key(name)
    }

    /// Behavior for `ability`: its built-in one, or the registered custom one.
    pub fn instantiate(&self, ability: &AbilityDef) -> Option<Box<dyn AbilityBehavior>> {
        if let Some(behavior) = ability.kind.builtin_behavior() {
            return Some(behavior);
        }
        let name = ability.kind.custom_name()?;
        self.find(name).map(|factory| factory.create(ability))
    }

    pub fn len(&self) -> usize {
        self.lookup_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup_table.is_empty()
    }

    /// Registered names, sorted (for debugging and validation output).
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.lookup_table.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorRegistry")
            .field("behaviors", &self.names())
            .finish()
    }
}
