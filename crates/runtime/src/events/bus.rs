//! Topic-based event bus implementation.

use std::collections::HashMap;

use gameplay_core::GameplayEvent;
use serde::{Deserialize, Serialize};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Tag grants and removals
    Tags,
    /// Attribute current-value changes
    Attributes,
    /// Effect application, refresh, periodic execution, removal
    Effects,
    /// Ability activation, end and cooldowns
    Abilities,
    /// Movement requests from ability behaviors
    Movement,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Tags,
        Topic::Attributes,
        Topic::Effects,
        Topic::Abilities,
        Topic::Movement,
    ];

    pub fn of(event: &GameplayEvent) -> Self {
        match event {
            GameplayEvent::TagAdded { .. } | GameplayEvent::TagRemoved { .. } => Topic::Tags,
            GameplayEvent::AttributeChanged { .. } => Topic::Attributes,
            GameplayEvent::EffectExecuted { .. }
            | GameplayEvent::EffectApplied { .. }
            | GameplayEvent::EffectRefreshed { .. }
            | GameplayEvent::EffectPeriodic { .. }
            | GameplayEvent::EffectRemoved { .. }
            | GameplayEvent::EffectRejected { .. } => Topic::Effects,
            GameplayEvent::AbilityActivated { .. }
            | GameplayEvent::AbilityEnded { .. }
            | GameplayEvent::CooldownStarted { .. } => Topic::Abilities,
            GameplayEvent::MovementRequested { .. } => Topic::Movement,
        }
    }
}

/// Receives events published to the topics it subscribed to.
pub trait EventListener {
    fn on_event(&mut self, event: &GameplayEvent);
}

impl<F: FnMut(&GameplayEvent)> EventListener for F {
    fn on_event(&mut self, event: &GameplayEvent) {
        self(event)
    }
}

/// Topic-based event bus
///
/// Listeners are called synchronously, in subscription order, from inside the
/// simulation call that produced the event.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<Topic, Vec<Box<dyn EventListener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&mut self, event: &GameplayEvent) {
        let topic = Topic::of(event);
        match self.listeners.get_mut(&topic) {
            Some(listeners) => {
                for listener in listeners.iter_mut() {
                    listener.on_event(event);
                }
            }
            None => tracing::trace!("No subscribers for topic {:?}", topic),
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&mut self, topic: Topic, listener: impl EventListener + 'static) {
        self.listeners
            .entry(topic)
            .or_default()
            .push(Box::new(listener));
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.listeners.get(&topic).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<_> = Topic::ALL
            .iter()
            .map(|topic| (*topic, self.subscriber_count(*topic)))
            .collect();
        f.debug_struct("EventBus").field("subscribers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameplay_core::{EntityId, TagId};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_only_see_their_topic() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&seen);
        bus.subscribe(Topic::Tags, move |event: &GameplayEvent| {
            sink.borrow_mut().push(event.clone())
        });

        bus.publish(&GameplayEvent::TagAdded {
            entity: EntityId(1),
            tag: TagId(0),
        });
        bus.publish(&GameplayEvent::AbilityActivated {
            entity: EntityId(1),
            ability: "Dash".into(),
        });

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(bus.subscriber_count(Topic::Tags), 1);
        assert_eq!(bus.subscriber_count(Topic::Movement), 0);
    }
}
