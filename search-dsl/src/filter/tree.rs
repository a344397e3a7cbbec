//! The filter arena and its composition protocol.

use serde_json::{json, Map, Value};
use tracing::{debug, trace};

use super::handle::Filter;
use super::node::{
    BoolClause, BoolClauses, Chain, ChainFamily, CompositorFn, Compositor, FilterNode, NodeId,
    NodeKind,
};
use crate::errors::DslError;

/// Id of the top-level scope every tree starts with.
pub const ROOT: NodeId = NodeId(0);

/// An arena holding one filter composition tree.
///
/// Nodes are only ever appended. A node's parent is fixed when it is attached
/// and never changes. Composition is a read-only walk, so a built tree can be
/// composed any number of times with identical results.
#[derive(Debug, Clone)]
pub struct FilterTree {
    nodes: Vec<FilterNode>,
}

impl Default for FilterTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterTree {
    /// Create a tree holding only the top-level scope.
    pub fn new() -> Self {
        Self {
            nodes: vec![FilterNode::child_of(None, NodeKind::Scope)],
        }
    }

    /// Fluent handle on the top-level scope.
    pub fn root(&mut self) -> Filter<'_> {
        Filter::new(self, ROOT)
    }

    /// Number of nodes in the arena, the top-level scope included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Result<&FilterNode, DslError> {
        self.nodes.get(id.0).ok_or(DslError::UnknownNode(id.0))
    }

    fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|node| &node.kind)
    }

    /// Children of a node in insertion order.
    ///
    /// Fails with `UnknownNode` for an id this tree did not issue.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], DslError> {
        Ok(&self.node(id)?.children)
    }

    /// Owning parent of a node; `None` for the top-level scope.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, DslError> {
        Ok(self.node(id)?.parent)
    }

    /// Append a node and register it as the last child of `parent`.
    pub(crate) fn attach(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(FilterNode::child_of(Some(parent), kind));
        self.nodes[parent.0].children.push(id);
        trace!(node = id.0, parent = parent.0, "Attached filter node");
        id
    }

    pub(crate) fn attach_composited(&mut self, parent: NodeId, compositor: Compositor) -> NodeId {
        self.attach(parent, NodeKind::Composited(CompositorFn(compositor)))
    }

    /// Attach a bool root together with its three clause scopes.
    pub(crate) fn attach_bool(&mut self, parent: NodeId) -> (NodeId, BoolClauses) {
        let root = self.attach(parent, NodeKind::Scope);
        let scope = |clause| NodeKind::BoolClause { root, clause };
        let clauses = BoolClauses {
            must: self.attach(root, scope(BoolClause::Must)),
            must_not: self.attach(root, scope(BoolClause::MustNot)),
            should: self.attach(root, scope(BoolClause::Should)),
        };
        self.nodes[root.0].kind = NodeKind::BoolRoot(clauses);
        (root, clauses)
    }

    /// Attach an and/or node below `parent`.
    ///
    /// When `parent` is itself a member of a chain of the same family, the new
    /// node joins that chain's root; otherwise it starts a new chain.
    pub(crate) fn attach_chain(&mut self, parent: NodeId, family: ChainFamily) -> NodeId {
        let continued = match self.kind(parent) {
            Some(NodeKind::Chain(chain)) if chain.family == family => Some(chain.root),
            _ => None,
        };
        let id = NodeId(self.nodes.len());
        let root = continued.unwrap_or(id);
        self.attach(
            parent,
            NodeKind::Chain(Chain {
                family,
                root,
                conditions: Vec::new(),
            }),
        );
        self.register_condition(root, id);
        id
    }

    fn register_condition(&mut self, root: NodeId, condition: NodeId) {
        if let Some(FilterNode {
            kind: NodeKind::Chain(chain),
            ..
        }) = self.nodes.get_mut(root.0)
        {
            chain.conditions.push(condition);
        }
    }

    /// The clause scopes of the bool family `id` belongs to.
    pub(crate) fn bool_clauses(&self, id: NodeId) -> Option<BoolClauses> {
        let root = match self.kind(id)? {
            NodeKind::BoolRoot(_) => id,
            NodeKind::BoolClause { root, .. } => *root,
            _ => return None,
        };
        match self.kind(root)? {
            NodeKind::BoolRoot(clauses) => Some(*clauses),
            _ => None,
        }
    }

    /// Walk ownership links upward from `id`'s parent to the nearest member of
    /// a bool/and/or family and return that family's root.
    pub(crate) fn enclosing_root(&self, id: NodeId) -> Result<NodeId, DslError> {
        let mut current = self.parent(id)?;
        while let Some(node) = current {
            if let Some(root) = self.kind(node).and_then(|kind| kind.family_root(node)) {
                return Ok(root);
            }
            current = self.parent(node)?;
        }
        Err(DslError::Navigation)
    }

    /// Compose the whole tree.
    pub fn compose(&self) -> Result<Value, DslError> {
        debug!(nodes = self.nodes.len(), "Composing filter tree");
        self.compose_node(ROOT)
    }

    /// Compose the whole tree and serialize it.
    pub fn to_json(&self) -> Result<String, DslError> {
        Ok(serde_json::to_string(&self.compose()?)?)
    }

    /// Compose the sub-tree rooted at `id`.
    pub fn compose_node(&self, id: NodeId) -> Result<Value, DslError> {
        match &self.node(id)?.kind {
            NodeKind::Scope => self.compose_child(id),
            NodeKind::Raw(value) => Ok(value.clone()),
            NodeKind::Unresolved(err) => Err(err.clone()),
            NodeKind::Composited(CompositorFn(compositor)) => compositor(self, id),
            NodeKind::Nested(path) => Ok(json!({
                "nested": {
                    "path": path,
                    "filter": self.compose_child(id)?
                }
            })),
            NodeKind::BoolRoot(clauses) => self.compose_bool(id, clauses),
            NodeKind::BoolClause { .. } => Err(DslError::UnsupportedRootComposition("bool")),
            NodeKind::Chain(chain) if chain.root != id => {
                Err(DslError::UnsupportedRootComposition(chain.family.key()))
            }
            NodeKind::Chain(chain) => self.compose_chain(chain),
        }
    }

    /// Compose the single child of `id`.
    ///
    /// No children compose to `{}`; more than one is an arity error.
    pub fn compose_child(&self, id: NodeId) -> Result<Value, DslError> {
        match self.children(id)? {
            [] => Ok(json!({})),
            [only] => self.compose_node(*only),
            many => Err(DslError::arity(many.len())),
        }
    }

    /// Compose every child of `id` in insertion order.
    pub fn compose_children(&self, id: NodeId) -> Result<Vec<Value>, DslError> {
        self.children(id)?
            .iter()
            .map(|child| self.compose_node(*child))
            .collect()
    }

    fn compose_bool(&self, root: NodeId, clauses: &BoolClauses) -> Result<Value, DslError> {
        // Only the three clause scopes may hang off a bool root.
        let misplaced = self
            .children(root)?
            .iter()
            .filter(|child| !BoolClause::ALL.iter().any(|c| clauses.get(*c) == **child))
            .count();
        if misplaced > 0 {
            return Err(DslError::MisplacedBoolFilter { found: misplaced });
        }

        let mut body = Map::new();
        for clause in BoolClause::ALL {
            match self.children(clauses.get(clause))? {
                [] => {}
                [only] => {
                    body.insert(clause.key().to_string(), self.compose_node(*only)?);
                }
                many => return Err(DslError::arity(many.len())),
            }
        }
        Ok(json!({ "bool": body }))
    }

    fn compose_chain(&self, chain: &Chain) -> Result<Value, DslError> {
        let mut filters = Vec::with_capacity(chain.conditions.len());
        for condition in &chain.conditions {
            // Members of the same chain are conditions in their own right.
            let functional: Vec<NodeId> = self
                .children(*condition)?
                .iter()
                .copied()
                .filter(|child| !self.continues_chain(*child, chain))
                .collect();
            match functional.as_slice() {
                [] => {}
                [only] => filters.push(self.compose_node(*only)?),
                many => return Err(DslError::arity(many.len())),
            }
        }

        let mut body = Map::new();
        body.insert(chain.family.key().to_string(), Value::Array(filters));
        Ok(Value::Object(body))
    }

    fn continues_chain(&self, id: NodeId, chain: &Chain) -> bool {
        matches!(
            self.kind(id),
            Some(NodeKind::Chain(other)) if other.family == chain.family && other.root == chain.root
        )
    }
}
