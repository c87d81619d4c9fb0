//! Hierarchical gameplay tags.
//!
//! ```text
//! TagRegistry   path ↔ id, ancestor/descendant closure (shared, read-only at runtime)
//!     ↓
//! TagSet        tags owned by one entity
//!     ↓
//! TagQuery      boolean policy evaluated against a TagSet
//! ```

pub mod query;
pub mod registry;
pub mod set;

pub use query::{TagQuery, TagQueryExpr, TagQueryNode};
pub use registry::{TagEntry, TagError, TagId, TagRegistry};
pub use set::TagSet;
