//! Runtime orchestration for the gameplay simulation.
//!
//! This crate wires loaded content, owner state and host-side behaviors into a
//! single [`Simulation`]. Consumers spawn owners from profiles, grant and
//! activate abilities by name, apply effects across entities, step time, and
//! observe the resulting [`GameplayEvent`]s through the [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`simulation`] hosts the orchestrator and builder
//! - [`behaviors`] maps `Custom` ability kinds to host behavior factories
//! - [`events`] provides topic-based event routing
//! - [`movement`] forwards movement requests to the embedding game
pub mod behaviors;
pub mod config;
pub mod error;
pub mod events;
pub mod movement;
pub mod simulation;

pub use behaviors::{
    BehaviorFactory, BehaviorRegistry, BlinkBehavior, BlinkFactory, FnFactory, GrappleBehavior,
    GrappleFactory,
};
pub use config::SimulationConfig;
pub use error::{Result, RuntimeError};
pub use events::{EventBus, EventListener, GameplayEvent, Topic};
pub use movement::{MovementHost, RecordingMovementHost};
pub use simulation::{AttributeSnapshot, OwnerSnapshot, Simulation, SimulationBuilder};
