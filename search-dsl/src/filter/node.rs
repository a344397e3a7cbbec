//! Filter node kinds.

use std::fmt;

use serde_json::Value;

use super::FilterTree;
use crate::errors::DslError;
use crate::property_path::PropertyPath;

/// Index of a node inside its [`FilterTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena. Nodes are numbered in creation order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Caller-supplied composition for a node, given the tree and the node itself.
pub type Compositor = fn(&FilterTree, NodeId) -> Result<Value, DslError>;

/// The three permanent clause scopes of a bool filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolClause {
    Must,
    MustNot,
    Should,
}

impl BoolClause {
    pub const ALL: [BoolClause; 3] = [BoolClause::Must, BoolClause::MustNot, BoolClause::Should];

    /// Key of the clause inside the composed `bool` object.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Must => "must",
            Self::MustNot => "must_not",
            Self::Should => "should",
        }
    }
}

/// Clause scope node ids owned by a bool root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolClauses {
    pub must: NodeId,
    pub must_not: NodeId,
    pub should: NodeId,
}

impl BoolClauses {
    pub fn get(&self, clause: BoolClause) -> NodeId {
        match clause {
            BoolClause::Must => self.must,
            BoolClause::MustNot => self.must_not,
            BoolClause::Should => self.should,
        }
    }
}

/// Associative filter families that flatten chained calls into one array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    And,
    Or,
}

impl ChainFamily {
    pub fn key(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Membership of a node in an and/or chain.
///
/// Every member points at the chain root; only the root lists the registered
/// conditions, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Chain {
    pub family: ChainFamily,
    pub root: NodeId,
    pub conditions: Vec<NodeId>,
}

#[derive(Clone, Copy)]
pub(crate) struct CompositorFn(pub Compositor);

impl fmt::Debug for CompositorFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompositorFn(..)")
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    /// Plain filter scope (the tree root and `wrap()`); composes its single child.
    Scope,
    /// Pre-built JSON fragment, composed verbatim.
    Raw(Value),
    /// Leaf whose property accessor failed to resolve; composing it fails.
    Unresolved(DslError),
    Composited(CompositorFn),
    Nested(PropertyPath),
    BoolRoot(BoolClauses),
    BoolClause { root: NodeId, clause: BoolClause },
    Chain(Chain),
}

impl NodeKind {
    /// The root of the bool/and/or family this node belongs to, if any.
    pub fn family_root(&self, own_id: NodeId) -> Option<NodeId> {
        match self {
            Self::BoolRoot(_) => Some(own_id),
            Self::BoolClause { root, .. } => Some(*root),
            Self::Chain(chain) => Some(chain.root),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FilterNode {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl FilterNode {
    /// A detached node. Linking it into the parent is the arena's job.
    pub fn child_of(parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self {
            parent,
            children: Vec::new(),
            kind,
        }
    }
}
