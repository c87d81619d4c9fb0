//! Topic-based fan-out of gameplay events.
//!
//! Owners queue [`GameplayEvent`]s; the simulation drains them after every
//! mutating call and publishes each one to the listeners of its [`Topic`].

mod bus;

pub use bus::{EventBus, EventListener, Topic};
pub use gameplay_core::GameplayEvent;
