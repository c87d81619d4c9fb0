//! Boolean tag queries used as activation and applicability policy.
//!
//! A query is an immutable tree of [`TagQueryNode`]s evaluated against a
//! [`TagSet`]. Authoring data refers to tags by path ([`TagQueryExpr`]);
//! those expressions are resolved once against a registry into id-based
//! queries.
//!
//! # Semantics
//!
//! | Node       | True when                                   | Empty children |
//! |------------|---------------------------------------------|----------------|
//! | `All`      | every child is true                         | true           |
//! | `Any`      | at least one child is true                  | false          |
//! | `None`     | no child is true                            | true           |
//! | `Tag`      | set owns the tag or one of its descendants  | -              |
//! | `ExactTag` | set owns exactly that tag                   | -              |
//!
//! A query without a root always matches.

use std::fmt::Write as _;

use super::registry::{TagError, TagId, TagRegistry};
use super::set::TagSet;

/// A node in a resolved tag query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagQueryNode {
    All(Vec<TagQueryNode>),
    Any(Vec<TagQueryNode>),
    None(Vec<TagQueryNode>),
    Tag(TagId),
    ExactTag(TagId),
}

impl TagQueryNode {
    pub fn evaluate(&self, tags: &TagSet, registry: &TagRegistry) -> bool {
        match self {
            Self::All(children) => children.iter().all(|c| c.evaluate(tags, registry)),
            Self::Any(children) => children.iter().any(|c| c.evaluate(tags, registry)),
            Self::None(children) => !children.iter().any(|c| c.evaluate(tags, registry)),
            Self::Tag(id) => tags.has(*id, registry),
            Self::ExactTag(id) => tags.has_exact(*id),
        }
    }

    fn leaves(ids: &[TagId]) -> Vec<TagQueryNode> {
        ids.iter().copied().map(Self::Tag).collect()
    }

    fn describe_into(&self, registry: &TagRegistry, out: &mut String) {
        let (label, children) = match self {
            Self::All(children) => ("all", children),
            Self::Any(children) => ("any", children),
            Self::None(children) => ("none", children),
            Self::Tag(id) => {
                out.push_str(registry.path_of(*id).unwrap_or("<unknown>"));
                return;
            }
            Self::ExactTag(id) => {
                let _ = write!(out, "={}", registry.path_of(*id).unwrap_or("<unknown>"));
                return;
            }
        };

        out.push_str(label);
        out.push('(');
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            child.describe_into(registry, out);
        }
        out.push(')');
    }
}

/// A tag query with an optional root. A missing root means "no requirement".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagQuery {
    root: Option<TagQueryNode>,
}

impl TagQuery {
    /// Query that matches every tag set.
    pub const fn empty() -> Self {
        Self { root: None }
    }

    pub fn new(root: TagQueryNode) -> Self {
        Self { root: Some(root) }
    }

    /// Matches when every tag in `ids` is owned (hierarchically).
    pub fn require_all(ids: &[TagId]) -> Self {
        Self::new(TagQueryNode::All(TagQueryNode::leaves(ids)))
    }

    /// Matches when at least one tag in `ids` is owned (hierarchically).
    pub fn require_any(ids: &[TagId]) -> Self {
        Self::new(TagQueryNode::Any(TagQueryNode::leaves(ids)))
    }

    /// Matches when none of `ids` is owned (hierarchically).
    pub fn block_any(ids: &[TagId]) -> Self {
        Self::new(TagQueryNode::None(TagQueryNode::leaves(ids)))
    }

    /// `All(All(required), None(blocked))`.
    pub fn require_and_block(required: &[TagId], blocked: &[TagId]) -> Self {
        Self::new(TagQueryNode::All(vec![
            TagQueryNode::All(TagQueryNode::leaves(required)),
            TagQueryNode::None(TagQueryNode::leaves(blocked)),
        ]))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&TagQueryNode> {
        self.root.as_ref()
    }

    pub fn evaluate(&self, tags: &TagSet, registry: &TagRegistry) -> bool {
        self.root
            .as_ref()
            .is_none_or(|root| root.evaluate(tags, registry))
    }

    /// Evaluates as a blocking gate: an empty query never blocks.
    pub fn blocks(&self, tags: &TagSet, registry: &TagRegistry) -> bool {
        self.root
            .as_ref()
            .is_some_and(|root| root.evaluate(tags, registry))
    }

    /// Human-readable rendering for editors and logs, e.g. `all(State, none(=State.Dead))`.
    pub fn describe(&self, registry: &TagRegistry) -> String {
        let mut out = String::new();
        match &self.root {
            Some(root) => root.describe_into(registry, &mut out),
            None => out.push_str("<always>"),
        }
        out
    }
}

/// Path-based query expression as written in content files.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagQueryExpr {
    All(Vec<TagQueryExpr>),
    Any(Vec<TagQueryExpr>),
    None(Vec<TagQueryExpr>),
    Tag(String),
    ExactTag(String),
}

impl TagQueryExpr {
    /// Resolves every path against `registry`. Unknown paths are an error:
    /// a query silently dropping a leaf would change its meaning.
    pub fn resolve(&self, registry: &TagRegistry) -> Result<TagQueryNode, TagError> {
        let resolve_all = |children: &[TagQueryExpr]| {
            children
                .iter()
                .map(|c| c.resolve(registry))
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(match self {
            Self::All(children) => TagQueryNode::All(resolve_all(children)?),
            Self::Any(children) => TagQueryNode::Any(resolve_all(children)?),
            Self::None(children) => TagQueryNode::None(resolve_all(children)?),
            Self::Tag(path) => TagQueryNode::Tag(registry.require(path)?),
            Self::ExactTag(path) => TagQueryNode::ExactTag(registry.require(path)?),
        })
    }
}

impl TagQuery {
    /// Resolves an optional expression; `None` yields the empty query.
    pub fn from_expr(
        expr: Option<&TagQueryExpr>,
        registry: &TagRegistry,
    ) -> Result<Self, TagError> {
        Ok(Self {
            root: expr.map(|e| e.resolve(registry)).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        registry: TagRegistry,
        state: TagId,
        stunned: TagId,
        rooted: TagId,
        dash: TagId,
    }

    fn fixture() -> Fixture {
        let registry = TagRegistry::from_paths([
            "State",
            "State.Stunned",
            "State.Rooted",
            "Ability.Dash",
        ])
        .unwrap();
        Fixture {
            state: registry.id_of("State").unwrap(),
            stunned: registry.id_of("State.Stunned").unwrap(),
            rooted: registry.id_of("State.Rooted").unwrap(),
            dash: registry.id_of("Ability.Dash").unwrap(),
            registry,
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        let f = fixture();
        let query = TagQuery::empty();
        assert!(query.evaluate(&TagSet::new(), &f.registry));
        assert!(query.evaluate(&[f.stunned].into_iter().collect(), &f.registry));
        assert!(!query.blocks(&[f.stunned].into_iter().collect(), &f.registry));
    }

    #[test]
    fn vacuous_composites() {
        let f = fixture();
        let empty = TagSet::new();
        assert!(TagQueryNode::All(vec![]).evaluate(&empty, &f.registry));
        assert!(!TagQueryNode::Any(vec![]).evaluate(&empty, &f.registry));
        assert!(TagQueryNode::None(vec![]).evaluate(&empty, &f.registry));
    }

    #[test]
    fn tag_leaf_is_hierarchical_exact_leaf_is_not() {
        let f = fixture();
        let set: TagSet = [f.stunned].into_iter().collect();

        assert!(TagQueryNode::Tag(f.state).evaluate(&set, &f.registry));
        assert!(!TagQueryNode::ExactTag(f.state).evaluate(&set, &f.registry));
        assert!(TagQueryNode::ExactTag(f.stunned).evaluate(&set, &f.registry));
    }

    #[test]
    fn require_and_block_shape() {
        let f = fixture();
        let query = TagQuery::require_and_block(&[f.dash], &[f.stunned, f.rooted]);

        let ready: TagSet = [f.dash].into_iter().collect();
        let stunned: TagSet = [f.dash, f.stunned].into_iter().collect();
        let missing: TagSet = TagSet::new();

        assert!(query.evaluate(&ready, &f.registry));
        assert!(!query.evaluate(&stunned, &f.registry));
        assert!(!query.evaluate(&missing, &f.registry));
    }

    #[test]
    fn builder_helpers() {
        let f = fixture();
        let set: TagSet = [f.rooted].into_iter().collect();

        assert!(TagQuery::require_any(&[f.stunned, f.rooted]).evaluate(&set, &f.registry));
        assert!(!TagQuery::require_all(&[f.stunned, f.rooted]).evaluate(&set, &f.registry));
        assert!(!TagQuery::block_any(&[f.state]).evaluate(&set, &f.registry));
        assert!(TagQuery::block_any(&[f.dash]).evaluate(&set, &f.registry));
    }

    #[test]
    fn expressions_resolve_by_path() {
        let f = fixture();
        let expr = TagQueryExpr::All(vec![
            TagQueryExpr::Tag("State".into()),
            TagQueryExpr::None(vec![TagQueryExpr::ExactTag("State.Rooted".into())]),
        ]);
        let query = TagQuery::from_expr(Some(&expr), &f.registry).unwrap();

        assert!(query.evaluate(&[f.stunned].into_iter().collect(), &f.registry));
        assert!(!query.evaluate(&[f.rooted].into_iter().collect(), &f.registry));
        assert_eq!(query.describe(&f.registry), "all(State, none(=State.Rooted))");
    }

    #[test]
    fn unknown_path_in_expression_is_an_error() {
        let f = fixture();
        let expr = TagQueryExpr::Any(vec![TagQueryExpr::Tag("State.Frozen".into())]);
        assert_eq!(
            TagQuery::from_expr(Some(&expr), &f.registry),
            Err(TagError::UnknownPath("State.Frozen".into()))
        );
        assert!(TagQuery::from_expr(None, &f.registry).unwrap().is_empty());
    }
}
