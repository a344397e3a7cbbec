//! Fluent handles over a [`FilterTree`].
//!
//! A handle borrows the tree mutably and points at one node. Every filter
//! operation attaches exactly one new child below that node and hands back a
//! handle on it: a [`Terminal`] for leaf filters, a [`Filter`] or
//! [`BoolFilter`] for scopes that take further children.

use std::ops::{Deref, DerefMut};

use serde_json::{json, Map, Value};

use super::bounds::Bounds;
use super::node::{BoolClauses, ChainFamily, Compositor, NodeId, NodeKind};
use super::tree::FilterTree;
use crate::errors::DslError;
use crate::property_path::{self, PropertyPath, Selector};

/// `{ key: { path: value } }`
fn field_object(key: &str, path: &PropertyPath, value: Value) -> Value {
    let mut field = Map::new();
    field.insert(path.as_dotted(), value);
    let mut filter = Map::new();
    filter.insert(key.to_string(), Value::Object(field));
    Value::Object(filter)
}

fn compose_not(tree: &FilterTree, id: NodeId) -> Result<Value, DslError> {
    Ok(json!({ "not": tree.compose_child(id)? }))
}

/// Handle on a leaf filter.
pub struct Terminal<'a> {
    tree: &'a mut FilterTree,
    id: NodeId,
}

impl<'a> Terminal<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Return to the root of the nearest enclosing bool/and/or filter.
    pub fn back(self) -> Result<Filter<'a>, DslError> {
        let root = self.tree.enclosing_root(self.id)?;
        Ok(Filter::new(self.tree, root))
    }

    pub fn compose(&self) -> Result<Value, DslError> {
        self.tree.compose_node(self.id)
    }

    pub fn to_json(&self) -> Result<String, DslError> {
        Ok(serde_json::to_string(&self.compose()?)?)
    }
}

/// Handle on a filter scope that accepts child filters.
pub struct Filter<'a> {
    tree: &'a mut FilterTree,
    id: NodeId,
}

impl<'a> Filter<'a> {
    pub(crate) fn new(tree: &'a mut FilterTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Return to the root of the nearest enclosing bool/and/or filter.
    pub fn back(&mut self) -> Result<Filter<'_>, DslError> {
        let root = self.tree.enclosing_root(self.id)?;
        Ok(Filter::new(&mut *self.tree, root))
    }

    /// Narrow to a bool handle when this node belongs to a bool filter.
    pub fn as_bool(&mut self) -> Option<BoolFilter<'_>> {
        let clauses = self.tree.bool_clauses(self.id)?;
        Some(BoolFilter {
            inner: Filter::new(&mut *self.tree, self.id),
            clauses,
        })
    }

    /// Compose the sub-tree below this handle.
    pub fn compose(&self) -> Result<Value, DslError> {
        self.tree.compose_node(self.id)
    }

    pub fn to_json(&self) -> Result<String, DslError> {
        Ok(serde_json::to_string(&self.compose()?)?)
    }

    fn leaf(&mut self, kind: NodeKind) -> Terminal<'_> {
        let id = self.tree.attach(self.id, kind);
        Terminal {
            tree: &mut *self.tree,
            id,
        }
    }

    fn field_leaf<P, B>(&mut self, property: P, build: B) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
        B: FnOnce(&PropertyPath) -> Value,
    {
        let kind = match property_path::resolve(property) {
            Ok(path) => NodeKind::Raw(build(&path)),
            Err(err) => NodeKind::Unresolved(err),
        };
        self.leaf(kind)
    }

    fn scope(&mut self, id: NodeId) -> Filter<'_> {
        Filter::new(&mut *self.tree, id)
    }

    /// `{"term": {path: value}}`
    pub fn term<P>(&mut self, property: P, value: impl Into<Value>) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
    {
        let value = value.into();
        self.field_leaf(property, |path| field_object("term", path, value))
    }

    /// Alias of [`Filter::term`].
    pub fn eq<P>(&mut self, property: P, value: impl Into<Value>) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.term(property, value)
    }

    /// `{"terms": {path: [values]}}`
    pub fn terms<P, I, V>(&mut self, property: P, values: I) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = Value::Array(values.into_iter().map(Into::into).collect());
        self.field_leaf(property, |path| field_object("terms", path, values))
    }

    /// `{"range": {path: {lte?, lt?, gte?, gt?}}}`
    pub fn range<P>(&mut self, property: P, bounds: Bounds) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.field_leaf(property, |path| field_object("range", path, bounds.to_value()))
    }

    pub fn lte<P>(&mut self, property: P, value: impl Into<Value>) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.range(property, Bounds::new().lte(value))
    }

    pub fn lt<P>(&mut self, property: P, value: impl Into<Value>) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.range(property, Bounds::new().lt(value))
    }

    pub fn gte<P>(&mut self, property: P, value: impl Into<Value>) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.range(property, Bounds::new().gte(value))
    }

    pub fn gt<P>(&mut self, property: P, value: impl Into<Value>) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.range(property, Bounds::new().gt(value))
    }

    /// `{"regexp": {path: pattern}}`
    pub fn reg_exp<P>(&mut self, property: P, pattern: impl Into<String>) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
    {
        let pattern = Value::String(pattern.into());
        self.field_leaf(property, |path| field_object("regexp", path, pattern))
    }

    /// `{"prefix": {path: prefix}}`
    pub fn prefix<P>(&mut self, property: P, prefix: impl Into<String>) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
    {
        let prefix = Value::String(prefix.into());
        self.field_leaf(property, |path| field_object("prefix", path, prefix))
    }

    /// `{"exists": {"field": path}}`
    pub fn exists<P>(&mut self, property: P) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.field_leaf(property, |path| json!({ "exists": { "field": path } }))
    }

    /// `{"missing": {"field": path}}`
    pub fn missing<P>(&mut self, property: P) -> Terminal<'_>
    where
        P: FnOnce(Selector) -> Selector,
    {
        self.field_leaf(property, |path| json!({ "missing": { "field": path } }))
    }

    /// `{"values": [ids]}`
    pub fn ids<I, V>(&mut self, ids: I) -> Terminal<'_>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let ids: Vec<Value> = ids.into_iter().map(Into::into).collect();
        self.leaf(NodeKind::Raw(json!({ "values": ids })))
    }

    /// `{"match_all": ""}`
    pub fn match_all(&mut self) -> Terminal<'_> {
        self.leaf(NodeKind::Raw(json!({ "match_all": "" })))
    }

    /// `{"value": amount}`
    pub fn limit(&mut self, amount: u64) -> Terminal<'_> {
        self.leaf(NodeKind::Raw(json!({ "value": amount })))
    }

    /// Attach a caller-built filter object, composed verbatim.
    pub fn raw(&mut self, value: Value) -> Terminal<'_> {
        self.leaf(NodeKind::Raw(value))
    }

    /// A scoping node without JSON meaning of its own; composes its single child.
    pub fn wrap(&mut self) -> Filter<'_> {
        let id = self.tree.attach(self.id, NodeKind::Scope);
        self.scope(id)
    }

    /// A node composed by `compositor`, which receives the tree and the node id.
    pub fn composited(&mut self, compositor: Compositor) -> Filter<'_> {
        let id = self.tree.attach_composited(self.id, compositor);
        self.scope(id)
    }

    /// `{"not": <single child>}`
    pub fn not(&mut self) -> Filter<'_> {
        self.composited(compose_not)
    }

    /// Start a new bool filter below this node.
    pub fn bool(&mut self) -> BoolFilter<'_> {
        let (id, clauses) = self.tree.attach_bool(self.id);
        BoolFilter {
            inner: self.scope(id),
            clauses,
        }
    }

    /// Add an `and` condition configured by `configure`.
    ///
    /// Called on a member of an `and` chain, the condition joins that chain and
    /// is flattened into the same array; otherwise a new chain starts here.
    pub fn and<F>(&mut self, configure: F) -> Filter<'_>
    where
        F: FnOnce(&mut Filter<'_>),
    {
        self.chain(ChainFamily::And, configure)
    }

    /// Add an `or` condition configured by `configure`. Chains like [`Filter::and`].
    pub fn or<F>(&mut self, configure: F) -> Filter<'_>
    where
        F: FnOnce(&mut Filter<'_>),
    {
        self.chain(ChainFamily::Or, configure)
    }

    fn chain<F>(&mut self, family: ChainFamily, configure: F) -> Filter<'_>
    where
        F: FnOnce(&mut Filter<'_>),
    {
        let id = self.tree.attach_chain(self.id, family);
        let mut chained = self.scope(id);
        configure(&mut chained);
        chained
    }

    /// Build a `nested` filter over the collection at `property`.
    ///
    /// `configure` runs immediately against the nested scope; the receiver is
    /// returned so building continues at this level.
    pub fn nested<P, F>(&mut self, property: P, configure: F) -> &mut Self
    where
        P: FnOnce(Selector) -> Selector,
        F: FnOnce(&mut Filter<'_>),
    {
        let kind = match property_path::resolve(property) {
            Ok(path) => NodeKind::Nested(path),
            Err(err) => NodeKind::Unresolved(err),
        };
        let id = self.tree.attach(self.id, kind);
        configure(&mut self.scope(id));
        self
    }
}

/// Handle on a member of a bool filter.
///
/// `must`, `must_not` and `should` always address the clause scopes of the
/// family root, whichever member they are called on. Each clause holds at most
/// one filter when the root is composed.
/// Filters attached to the root itself instead of a clause make the root fail
/// to compose.
pub struct BoolFilter<'a> {
    inner: Filter<'a>,
    clauses: BoolClauses,
}

impl<'a> BoolFilter<'a> {
    pub fn must<F>(&mut self, configure: F) -> BoolFilter<'_>
    where
        F: FnOnce(&mut Filter<'_>),
    {
        self.clause(self.clauses.must, configure)
    }

    pub fn must_not<F>(&mut self, configure: F) -> BoolFilter<'_>
    where
        F: FnOnce(&mut Filter<'_>),
    {
        self.clause(self.clauses.must_not, configure)
    }

    pub fn should<F>(&mut self, configure: F) -> BoolFilter<'_>
    where
        F: FnOnce(&mut Filter<'_>),
    {
        self.clause(self.clauses.should, configure)
    }

    fn clause<F>(&mut self, id: NodeId, configure: F) -> BoolFilter<'_>
    where
        F: FnOnce(&mut Filter<'_>),
    {
        let clauses = self.clauses;
        let mut scope = self.inner.scope(id);
        configure(&mut scope);
        BoolFilter {
            inner: scope,
            clauses,
        }
    }
}

impl<'a> Deref for BoolFilter<'a> {
    type Target = Filter<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for BoolFilter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
