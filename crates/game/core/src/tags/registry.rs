//! Tag registry — interns dotted tag paths and precomputes hierarchy closure.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{ErrorSeverity, GameError};

/// Registry-assigned identifier for a hierarchical tag path.
///
/// Ids are dense indices assigned in sorted path order during
/// [`TagRegistry::rebuild`]. They are only meaningful for the registry build
/// that produced them; holders must re-resolve by path after a rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagId(pub u32);

impl TagId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Runtime entry for a node in the tag tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagEntry {
    pub id: TagId,
    pub path: String,
    /// False for "virtual" ancestors that only exist because a deeper path
    /// was registered.
    pub explicit: bool,
    pub parent: Option<TagId>,
    /// Number of segments minus one (`State` = 0, `State.Stunned` = 1).
    pub depth: usize,
}

/// Errors raised for malformed tag paths.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("tag path is empty")]
    EmptyPath,

    #[error("tag path '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("tag path '{0}' contains whitespace")]
    Whitespace(String),

    #[error("unknown tag path '{0}'")]
    UnknownPath(String),
}

impl GameError for TagError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPath => "TAG_EMPTY_PATH",
            Self::EmptySegment(_) => "TAG_EMPTY_SEGMENT",
            Self::Whitespace(_) => "TAG_WHITESPACE",
            Self::UnknownPath(_) => "TAG_UNKNOWN_PATH",
        }
    }
}

/// Registry for hierarchical tags.
///
/// Provides:
/// - Path ↔ id bidirectional lookup
/// - Ancestor/descendant closure derived purely from dot-prefix decomposition
/// - Deterministic, idempotent rebuilds (ids follow sorted path order)
///
/// Registering `A.B.C` makes `A` and `A.B` resolvable as virtual ancestors even
/// if they were never registered themselves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagRegistry {
    sources: BTreeSet<String>,
    entries: Vec<TagEntry>,
    path_to_id: HashMap<String, TagId>,
    ancestors: Vec<Vec<TagId>>,
    descendants: Vec<Vec<TagId>>,
    generation: u64,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a seed list of paths with a single rebuild.
    pub fn from_paths<I, S>(paths: I) -> Result<Self, TagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for path in paths {
            let path = path.as_ref();
            Self::validate_path(path)?;
            registry.sources.insert(path.to_string());
        }
        registry.rebuild();
        Ok(registry)
    }

    /// Registers a path and returns its id.
    ///
    /// Registering an already-registered path is a no-op. Registering a new
    /// path triggers a full rebuild, which may renumber existing tags.
    pub fn register(&mut self, path: &str) -> Result<TagId, TagError> {
        Self::validate_path(path)?;

        if self.sources.contains(path) {
            if let Some(id) = self.id_of(path) {
                return Ok(id);
            }
        }

        self.sources.insert(path.to_string());
        self.rebuild();

        self.id_of(path)
            .ok_or_else(|| TagError::UnknownPath(path.to_string()))
    }

    /// Path → id. Unknown paths return `None`.
    #[inline]
    pub fn id_of(&self, path: &str) -> Option<TagId> {
        self.path_to_id.get(path).copied()
    }

    /// Path → id, treating an unknown path as an error.
    pub fn require(&self, path: &str) -> Result<TagId, TagError> {
        self.id_of(path)
            .ok_or_else(|| TagError::UnknownPath(path.to_string()))
    }

    /// Id → path. Unknown or stale ids return `None`.
    #[inline]
    pub fn path_of(&self, id: TagId) -> Option<&str> {
        self.entries.get(id.index()).map(|e| e.path.as_str())
    }

    pub fn entry(&self, id: TagId) -> Option<&TagEntry> {
        self.entries.get(id.index())
    }

    /// True when `ancestor`'s path is a proper dot-prefix of `id`'s path.
    ///
    /// A tag is never its own descendant.
    #[inline]
    pub fn is_descendant(&self, id: TagId, ancestor: TagId) -> bool {
        self.ancestors
            .get(id.index())
            .is_some_and(|ancestors| ancestors.binary_search(&ancestor).is_ok())
    }

    pub fn parent_of(&self, id: TagId) -> Option<TagId> {
        self.entries.get(id.index()).and_then(|e| e.parent)
    }

    /// All proper ancestors of `id`, sorted by id.
    pub fn ancestors_of(&self, id: TagId) -> &[TagId] {
        self.ancestors.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All proper descendants of `id`, sorted by id.
    pub fn descendants_of(&self, id: TagId) -> &[TagId] {
        self.descendants.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the tag was registered directly (not just implied by a child).
    pub fn is_explicit(&self, id: TagId) -> bool {
        self.entries.get(id.index()).is_some_and(|e| e.explicit)
    }

    /// Counter bumped on every rebuild; lets holders detect stale ids.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Total number of nodes, virtual ancestors included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in id (sorted path) order.
    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }

    /// Recomputes ids and the hierarchy closure from the registered paths.
    ///
    /// Fully replaces prior assignments. Calling it repeatedly without
    /// registering anything new yields identical ids.
    pub fn rebuild(&mut self) {
        let mut all_paths: BTreeSet<&str> = BTreeSet::new();
        for path in &self.sources {
            for prefix in Self::prefixes(path) {
                all_paths.insert(prefix);
            }
            all_paths.insert(path.as_str());
        }

        let path_to_id: HashMap<String, TagId> = all_paths
            .iter()
            .enumerate()
            .map(|(i, path)| (path.to_string(), TagId(i as u32)))
            .collect();

        let mut entries = Vec::with_capacity(all_paths.len());
        let mut ancestors = Vec::with_capacity(all_paths.len());
        let mut descendants = vec![Vec::new(); all_paths.len()];

        for (i, path) in all_paths.iter().enumerate() {
            let id = TagId(i as u32);
            let mut chain: Vec<TagId> = Self::prefixes(path)
                .filter_map(|prefix| path_to_id.get(prefix).copied())
                .collect();
            let parent = chain.last().copied();
            chain.sort_unstable();

            for ancestor in &chain {
                descendants[ancestor.index()].push(id);
            }

            entries.push(TagEntry {
                id,
                path: path.to_string(),
                explicit: self.sources.contains(*path),
                parent,
                depth: chain.len(),
            });
            ancestors.push(chain);
        }

        // Ids are visited in ascending order, so each descendant list is already sorted.
        self.entries = entries;
        self.path_to_id = path_to_id;
        self.ancestors = ancestors;
        self.descendants = descendants;
        self.generation += 1;

        debug!(
            target: "gameplay::tags",
            registered = self.sources.len(),
            nodes = self.entries.len(),
            generation = self.generation,
            "tag registry rebuilt"
        );
    }

    /// Proper prefixes of a path, shortest first: `A.B.C` → `A`, `A.B`.
    fn prefixes(path: &str) -> impl Iterator<Item = &str> {
        path.match_indices(EngineConfig::TAG_SEPARATOR)
            .map(move |(idx, _)| &path[..idx])
    }

    fn validate_path(path: &str) -> Result<(), TagError> {
        if path.is_empty() {
            return Err(TagError::EmptyPath);
        }
        if path.chars().any(char::is_whitespace) {
            return Err(TagError::Whitespace(path.to_string()));
        }
        if path.split(EngineConfig::TAG_SEPARATOR).any(str::is_empty) {
            return Err(TagError::EmptySegment(path.to_string()));
        }
        Ok(())
    }
}
