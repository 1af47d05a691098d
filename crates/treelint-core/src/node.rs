//! Arena-backed immutable syntax tree.
//!
//! Trees are produced by an external parser through [`TreeBuilder`] and are
//! read-only afterwards. Parent/child relations are stored as arena indices,
//! so the back-reference from child to parent never forms an ownership cycle
//! and the arena is the single teardown point for all nodes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind tag of a syntax-tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The synthetic root of a tree (one per tree).
    Root,
    /// A class definition.
    ClassDef,
    /// A module definition.
    ModuleDef,
    /// A method definition.
    MethodDef,
    /// A method or function call. The node name is the callee.
    MethodCall,
    /// A block attached to a call, or a bare scope.
    Block,
    /// An identifier reference.
    Identifier,
    /// A literal value (string, symbol, number). The node name is its text.
    Literal,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Root => "root",
            Self::ClassDef => "class",
            Self::ModuleDef => "module",
            Self::MethodDef => "def",
            Self::MethodCall => "call",
            Self::Block => "block",
            Self::Identifier => "ident",
            Self::Literal => "literal",
        };
        write!(f, "{s}")
    }
}

/// Byte-offset span of a node in its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Opaque handle to a node within one [`Tree`].
///
/// Ids are only meaningful for the tree that issued them; resolving an id
/// against another tree yields [`TreeError::InvalidNodeReference`] (or an
/// arbitrary node if the index happens to be in range, which is why handles
/// should never be carried across trees).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors for tree construction and node resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A node handle did not resolve within its tree.
    #[error("invalid node reference: index {index} out of bounds")]
    InvalidNodeReference {
        /// The out-of-range arena index.
        index: usize,
    },

    /// `TreeBuilder::root` was called twice.
    #[error("tree already has a root")]
    RootAlreadySet,

    /// `TreeBuilder::finish` was called before any root was added.
    #[error("cannot finish an empty tree")]
    EmptyTree,

    /// The arena ran out of addressable node ids.
    #[error("tree exceeds the maximum addressable node count")]
    TreeTooLarge,
}

/// Allocates the id for the node at `index`, failing once the arena can no
/// longer address it.
fn node_id_at(index: usize) -> Result<NodeId, TreeError> {
    u32::try_from(index)
        .map(NodeId)
        .map_err(|_| TreeError::TreeTooLarge)
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    name: Option<String>,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An immutable syntax tree owning all of its nodes.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Tree {
    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: self.root,
        }
    }

    /// Resolves a node id to a reference.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidNodeReference`] if the id is out of range
    /// for this tree.
    pub fn get(&self, id: NodeId) -> Result<NodeRef<'_>, TreeError> {
        if id.index() < self.nodes.len() {
            Ok(NodeRef { tree: self, id })
        } else {
            Err(TreeError::InvalidNodeReference { index: id.index() })
        }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes. Always false for a built tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        // Ids handed out by this tree's builder are in range by construction.
        &self.nodes[id.index()]
    }
}

/// A cheap read-only handle to one node of a [`Tree`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    /// The node's id within its tree.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    #[must_use]
    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    /// The node's kind tag.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.tree.data(self.id).kind
    }

    /// The node's name, if it carries one (class name, callee, literal text).
    #[must_use]
    pub fn name(&self) -> Option<&'t str> {
        self.tree.data(self.id).name.as_deref()
    }

    /// The node's source span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.tree.data(self.id).span
    }

    /// The node's parent, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.tree.data(self.id).parent.map(|id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    /// The node's children, in source order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'t>> + '_ {
        let tree = self.tree;
        self.tree
            .data(self.id)
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    /// The child at `index`, if the node has that many children.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<NodeRef<'t>> {
        let tree = self.tree;
        self.tree
            .data(self.id)
            .children
            .get(index)
            .map(|&id| NodeRef { tree, id })
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.tree.data(self.id).children.len()
    }

    /// Lazy walk of the node's ancestors, innermost first.
    ///
    /// The iterator is finite (it ends at the root) and restartable: calling
    /// `ancestors()` again yields a fresh walk.
    #[must_use]
    pub fn ancestors(&self) -> Ancestors<'t> {
        Ancestors {
            tree: self.tree,
            next: self.tree.data(self.id).parent,
        }
    }
}

/// Iterator over a node's ancestors, innermost first. See [`NodeRef::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors<'t> {
    tree: &'t Tree,
    next: Option<NodeId>,
}

impl<'t> Iterator for Ancestors<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.data(id).parent;
        Some(NodeRef {
            tree: self.tree,
            id,
        })
    }
}

/// Builder for [`Tree`]. The only mutation surface; consumed by `finish`.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl TreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the root node.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::RootAlreadySet`] if a root exists.
    pub fn root(&mut self, kind: NodeKind, span: Span) -> Result<NodeId, TreeError> {
        if self.root.is_some() {
            return Err(TreeError::RootAlreadySet);
        }
        let id = self.push(kind, None, span, None)?;
        self.root = Some(id);
        Ok(id)
    }

    /// Adds an unnamed child under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidNodeReference`] if `parent` is unknown.
    pub fn child_of(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        span: Span,
    ) -> Result<NodeId, TreeError> {
        self.attach(parent, kind, None, span)
    }

    /// Adds a named child under `parent` (class name, callee, literal text).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidNodeReference`] if `parent` is unknown.
    pub fn named_child_of(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        name: impl Into<String>,
        span: Span,
    ) -> Result<NodeId, TreeError> {
        self.attach(parent, kind, Some(name.into()), span)
    }

    /// Finishes the tree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyTree`] if no root was added.
    pub fn finish(self) -> Result<Tree, TreeError> {
        let root = self.root.ok_or(TreeError::EmptyTree)?;
        Ok(Tree {
            nodes: self.nodes,
            root,
        })
    }

    fn attach(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        name: Option<String>,
        span: Span,
    ) -> Result<NodeId, TreeError> {
        if parent.index() >= self.nodes.len() {
            return Err(TreeError::InvalidNodeReference {
                index: parent.index(),
            });
        }
        let id = self.push(kind, name, span, Some(parent))?;
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    fn push(
        &mut self,
        kind: NodeKind,
        name: Option<String>,
        span: Span,
        parent: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        let id = node_id_at(self.nodes.len())?;
        self.nodes.push(NodeData {
            kind,
            name,
            span,
            parent,
            children: Vec::new(),
        });
        Ok(id)
    }
}
