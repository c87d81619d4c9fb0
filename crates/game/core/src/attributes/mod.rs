//! Attribute system.
//!
//! ```text
//! AttributeDef       identity, default, static bounds, linked cap
//!      ↓
//! AttributeProfile   named seed values with single inheritance
//!      ↓
//! AttributeStore     per-entity base/current values + change queue
//! ```
//!
//! Effect modifiers are not baked into the store; the owner aggregate folds
//! them over the stored value on read.

pub mod definition;
pub mod profile;
pub mod store;

pub use definition::AttributeDef;
pub use profile::{AttributeProfile, ProfileEntry};
pub use store::{AttributeChange, AttributeStore, AttributeValue};
