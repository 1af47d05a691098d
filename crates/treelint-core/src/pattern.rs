//! Declarative structural patterns over tree nodes.
//!
//! Rules describe *what* shape to find instead of hand-rolling ancestor-walk
//! loops. A [`Pattern`] is an ephemeral predicate built per query; matching is
//! purely structural and keeps no state between calls.

use crate::node::{NodeId, NodeKind, NodeRef};

/// How a pattern constrains a node's name.
#[derive(Debug, Clone)]
enum NameMatch {
    Exact(String),
    OneOf(Vec<String>),
}

impl NameMatch {
    fn matches(&self, name: Option<&str>) -> bool {
        match (self, name) {
            (Self::Exact(want), Some(got)) => want == got,
            (Self::OneOf(set), Some(got)) => set.iter().any(|w| w == got),
            (_, None) => false,
        }
    }
}

/// A composable structural predicate over a node and its surroundings.
///
/// An empty kind set matches any kind. Sub-patterns may constrain a child at
/// a fixed index and any ancestor. Referencing a child index beyond the
/// node's arity is a no-match, never an error.
///
/// ```
/// use treelint_core::{NodeKind, Pattern};
///
/// // A call named `namespace` or `task` carrying a block.
/// let definer = Pattern::kind(NodeKind::MethodCall)
///     .named_one_of(["namespace", "task"]);
/// # let _ = definer;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    kinds: Vec<NodeKind>,
    name: Option<NameMatch>,
    child: Option<(usize, Box<Pattern>)>,
    ancestor: Option<Box<Pattern>>,
}

impl Pattern {
    /// A pattern matching any node.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// A pattern matching one kind.
    #[must_use]
    pub fn kind(kind: NodeKind) -> Self {
        Self {
            kinds: vec![kind],
            ..Self::default()
        }
    }

    /// A pattern matching any of the given kinds.
    #[must_use]
    pub fn kinds(kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Requires the node's name to equal `name`.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(NameMatch::Exact(name.into()));
        self
    }

    /// Requires the node's name to be one of `names`.
    ///
    /// This is how domain vocabulary (e.g. which callees count as namespace
    /// definers) stays configurable per rule instead of baked into the engine.
    #[must_use]
    pub fn named_one_of<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.name = Some(NameMatch::OneOf(names.into_iter().map(Into::into).collect()));
        self
    }

    /// Requires the child at `index` to match `sub`.
    #[must_use]
    pub fn with_child_at(mut self, index: usize, sub: Pattern) -> Self {
        self.child = Some((index, Box::new(sub)));
        self
    }

    /// Requires some ancestor (any distance) to match `sub`.
    #[must_use]
    pub fn inside(mut self, sub: Pattern) -> Self {
        self.ancestor = Some(Box::new(sub));
        self
    }

    /// Tests the pattern against a node.
    #[must_use]
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&node.kind()) {
            return false;
        }
        if let Some(name) = &self.name {
            if !name.matches(node.name()) {
                return false;
            }
        }
        if let Some((index, sub)) = &self.child {
            match node.child(*index) {
                Some(child) if sub.matches(child) => {}
                _ => return false,
            }
        }
        if let Some(sub) = &self.ancestor {
            if !any_ancestor(node, sub) {
                return false;
            }
        }
        true
    }

    /// Tests the pattern and collects the ids of the nodes bound by
    /// sub-patterns (the node itself, then child, then ancestor matches).
    ///
    /// Returns `None` on no-match.
    #[must_use]
    pub fn captures(&self, node: NodeRef<'_>) -> Option<Vec<NodeId>> {
        if !self.matches(node) {
            return None;
        }
        let mut captured = vec![node.id()];
        if let Some((index, sub)) = &self.child {
            if let Some(child) = node.child(*index) {
                if let Some(mut inner) = sub.captures(child) {
                    captured.append(&mut inner);
                }
            }
        }
        if let Some(sub) = &self.ancestor {
            if let Some(hit) = node.ancestors().find(|a| sub.matches(*a)) {
                captured.push(hit.id());
            }
        }
        Some(captured)
    }
}

/// Whether any ancestor of `node` matches `pattern`.
#[must_use]
pub fn any_ancestor(node: NodeRef<'_>, pattern: &Pattern) -> bool {
    node.ancestors().any(|a| pattern.matches(a))
}

/// Finds the closest ancestor of `node` matching `pattern`, giving up when a
/// `stop_at` kind is reached first.
///
/// This is the dominant query of structural lint rules ("nearest enclosing X
/// with no intervening Y"). The boundary node itself is not a candidate: an
/// ancestor whose kind is in `stop_at` ends the walk even if it would also
/// match `pattern`.
#[must_use]
pub fn nearest_ancestor<'t>(
    node: NodeRef<'t>,
    pattern: &Pattern,
    stop_at: &[NodeKind],
) -> Option<NodeRef<'t>> {
    for ancestor in node.ancestors() {
        if stop_at.contains(&ancestor.kind()) {
            return None;
        }
        if pattern.matches(ancestor) {
            return Some(ancestor);
        }
    }
    None
}
