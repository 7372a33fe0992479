//! Graph accessor: read-only typed views over the triple store.
//!
//! Everything here is a pure projection: nothing is cached between calls, so
//! every operation sees the store as it is right now.
//!
//! ```text
//! shape ──sh:property──▶ property ──sh:order──▶ "2"^^xsd:integer
//!                            └──────sh:group──▶ group ──sh:order──▶ "0"
//! ```
//!
//! A shape's top-level list merges ungrouped properties and the groups its
//! properties reference; each group carries its own sorted member list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Order, Term, Vocabulary};
use crate::storage::TripleStore;
use crate::Result;

// ============================================================================
// Views
// ============================================================================

/// A set of siblings whose order values are comparable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Ungrouped properties and groups of one shape.
    Shape(Term),
    /// Members of one group, restricted to the properties of `shape`.
    Group { shape: Term, group: Term },
}

impl Scope {
    pub fn shape(&self) -> &Term {
        match self {
            Scope::Shape(shape) | Scope::Group { shape, .. } => shape,
        }
    }

    pub fn group(&self) -> Option<&Term> {
        match self {
            Scope::Shape(_) => None,
            Scope::Group { group, .. } => Some(group),
        }
    }
}

/// One property shape as the editor sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyView {
    pub node: Term,
    pub order: Option<Order>,
    pub group: Option<Term>,
    pub path: Option<Term>,
    pub name: Option<Term>,
    pub datatype: Option<Term>,
    pub editor: Option<Term>,
    pub viewer: Option<Term>,
}

/// A property group with its members sorted by their own order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub node: Term,
    pub order: Option<Order>,
    pub label: Option<Term>,
    pub properties: Vec<PropertyView>,
}

/// An element of a shape's top-level list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListEntry {
    Property(PropertyView),
    Group(GroupView),
}

impl ListEntry {
    pub fn node(&self) -> &Term {
        match self {
            ListEntry::Property(p) => &p.node,
            ListEntry::Group(g) => &g.node,
        }
    }

    pub fn order(&self) -> Option<Order> {
        match self {
            ListEntry::Property(p) => p.order,
            ListEntry::Group(g) => g.order,
        }
    }

    pub fn as_group(&self) -> Option<&GroupView> {
        match self {
            ListEntry::Group(g) => Some(g),
            ListEntry::Property(_) => None,
        }
    }
}

/// The merged, sorted top-level list of a shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertiesList {
    pub entries: Vec<ListEntry>,
}

impl PropertiesList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListEntry> {
        self.entries.iter()
    }

    pub fn nodes(&self) -> Vec<Term> {
        self.entries.iter().map(|e| e.node().clone()).collect()
    }

    pub fn orders(&self) -> Vec<Option<Order>> {
        self.entries.iter().map(ListEntry::order).collect()
    }

    pub fn group(&self, group: &Term) -> Option<&GroupView> {
        self.entries.iter().filter_map(ListEntry::as_group).find(|g| &g.node == group)
    }
}

impl<'a> IntoIterator for &'a PropertiesList {
    type Item = &'a ListEntry;
    type IntoIter = std::slice::Iter<'a, ListEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A flat sibling: node plus its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeEntry {
    pub node: Term,
    pub order: Option<Order>,
}

// ============================================================================
// Sorting
// ============================================================================

/// Stable sort by order; missing orders last, ties keep encounter order.
pub fn sort_by_order<T>(items: &mut [T], order: impl Fn(&T) -> Option<Order>) {
    items.sort_by(|a, b| Order::cmp_optional(order(a), order(b)));
}

/// Order values held by more than one entry.
pub fn duplicates(entries: &[ScopeEntry]) -> Vec<Order> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for order in entries.iter().filter_map(|e| e.order) {
        if !seen.insert(order.value().to_bits()) && !dups.contains(&order) {
            dups.push(order);
        }
    }
    dups
}

// ============================================================================
// Accessor
// ============================================================================

/// Read-only view of a store through a vocabulary.
pub struct Accessor<'a, S: TripleStore + ?Sized> {
    store: &'a S,
    vocab: &'a Vocabulary,
}

impl<'a, S: TripleStore + ?Sized> Accessor<'a, S> {
    pub fn new(store: &'a S, vocab: &'a Vocabulary) -> Self {
        Self { store, vocab }
    }

    /// The entity's order, or `None` when absent or malformed.
    pub fn order_of(&self, node: &Term) -> Result<Option<Order>> {
        let objects = self.store.objects(node, &self.vocab.order())?;
        Ok(objects.iter().find_map(Order::from_term))
    }

    /// The raw group reference of a property (nodes only, no validity check).
    pub fn group_of(&self, property: &Term) -> Result<Option<Term>> {
        let objects = self.store.objects(property, &self.vocab.group())?;
        Ok(objects.into_iter().find(Term::is_node))
    }

    /// Property nodes linked from `shape`, deduplicated, in encounter order.
    pub fn property_nodes(&self, shape: &Term) -> Result<Vec<Term>> {
        let mut seen = HashSet::new();
        Ok(self
            .store
            .objects(shape, &self.vocab.has_property())?
            .into_iter()
            .filter(|o| o.is_node() && seen.insert(o.clone()))
            .collect())
    }

    /// Shapes that link `property`.
    pub fn owning_shapes(&self, property: &Term) -> Result<Vec<Term>> {
        let mut seen = HashSet::new();
        Ok(self
            .store
            .subjects(&self.vocab.has_property(), property)?
            .into_iter()
            .filter(|s| seen.insert(s.clone()))
            .collect())
    }

    pub fn property_view(&self, node: &Term) -> Result<PropertyView> {
        let first = |predicate: Term| self.store.any_object(node, &predicate);
        Ok(PropertyView {
            node: node.clone(),
            order: self.order_of(node)?,
            group: self.group_of(node)?,
            path: first(self.vocab.path())?,
            name: first(self.vocab.name())?,
            datatype: first(self.vocab.datatype())?,
            editor: first(self.vocab.editor())?.filter(Term::is_node),
            viewer: first(self.vocab.viewer())?.filter(Term::is_node),
        })
    }

    /// Properties of `shape` with their group references validated.
    ///
    /// A group reference is dropped when it names another property of the
    /// same shape (or the property itself): groups never nest.
    fn shape_property_views(&self, shape: &Term) -> Result<Vec<PropertyView>> {
        let nodes = self.property_nodes(shape)?;
        let members: HashSet<&Term> = nodes.iter().collect();
        let mut views = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let mut view = self.property_view(node)?;
            if view.group.as_ref().is_some_and(|g| members.contains(g)) {
                tracing::trace!(property = %node, "ignoring group reference to a sibling property");
                view.group = None;
            }
            views.push(view);
        }
        Ok(views)
    }

    /// The merged, sorted top-level list of `shape`.
    pub fn properties_of_shape(&self, shape: &Term) -> Result<PropertiesList> {
        let views = self.shape_property_views(shape)?;

        let mut group_nodes: Vec<Term> = Vec::new();
        for g in views.iter().filter_map(|v| v.group.as_ref()) {
            if !group_nodes.contains(g) {
                group_nodes.push(g.clone());
            }
        }

        let mut entries = Vec::with_capacity(views.len());
        let mut grouped: Vec<PropertyView> = Vec::new();
        for view in views {
            if view.group.is_some() {
                grouped.push(view);
            } else {
                entries.push(ListEntry::Property(view));
            }
        }

        for node in group_nodes {
            let mut properties: Vec<PropertyView> = grouped
                .iter()
                .filter(|p| p.group.as_ref() == Some(&node))
                .cloned()
                .collect();
            sort_by_order(&mut properties, |p| p.order);
            entries.push(ListEntry::Group(GroupView {
                order: self.order_of(&node)?,
                label: self.store.any_object(&node, &self.vocab.label())?,
                node,
                properties,
            }));
        }

        sort_by_order(&mut entries, ListEntry::order);
        tracing::trace!(shape = %shape, entries = entries.len(), "read properties of shape");
        Ok(PropertiesList { entries })
    }

    /// Every property referencing `group`, sorted. Not restricted to a shape.
    pub fn properties_of_group(&self, group: &Term) -> Result<Vec<PropertyView>> {
        let mut seen = HashSet::new();
        let mut views = Vec::new();
        for node in self.store.subjects(&self.vocab.group(), group)? {
            if node.is_node() && seen.insert(node.clone()) {
                views.push(self.property_view(&node)?);
            }
        }
        sort_by_order(&mut views, |p| p.order);
        Ok(views)
    }

    /// The scope `entity` currently orders within.
    ///
    /// Properties resolve through their first owning shape; groups through
    /// the shape of their first member.
    pub fn scope_of(&self, entity: &Term) -> Result<Option<Scope>> {
        if let Some(shape) = self.owning_shapes(entity)?.into_iter().next() {
            let views = self.shape_property_views(&shape)?;
            let group = views
                .into_iter()
                .find(|v| &v.node == entity)
                .and_then(|v| v.group);
            return Ok(Some(match group {
                Some(group) => Scope::Group { shape, group },
                None => Scope::Shape(shape),
            }));
        }

        for member in self.store.subjects(&self.vocab.group(), entity)? {
            if let Some(shape) = self.owning_shapes(&member)?.into_iter().next() {
                return Ok(Some(Scope::Shape(shape)));
            }
        }
        Ok(None)
    }

    /// The sorted siblings of a scope.
    pub fn scope_entries(&self, scope: &Scope) -> Result<Vec<ScopeEntry>> {
        match scope {
            Scope::Shape(shape) => Ok(self
                .properties_of_shape(shape)?
                .iter()
                .map(|e| ScopeEntry { node: e.node().clone(), order: e.order() })
                .collect()),
            Scope::Group { shape, group } => {
                let mut members: Vec<ScopeEntry> = self
                    .shape_property_views(shape)?
                    .into_iter()
                    .filter(|v| v.group.as_ref() == Some(group))
                    .map(|v| ScopeEntry { node: v.node, order: v.order })
                    .collect();
                sort_by_order(&mut members, |e| e.order);
                Ok(members)
            }
        }
    }

    /// One past the highest order in the scope; zero when nothing is ordered.
    pub fn next_order(&self, scope: &Scope) -> Result<Order> {
        Ok(self
            .scope_entries(scope)?
            .iter()
            .filter_map(|e| e.order)
            .max()
            .map_or(Order::ZERO, |max| max.offset(1)))
    }

    /// Order values that more than one sibling holds.
    pub fn duplicate_orders(&self, scope: &Scope) -> Result<Vec<Order>> {
        let dups = duplicates(&self.scope_entries(scope)?);
        if !dups.is_empty() {
            tracing::debug!(?scope, count = dups.len(), "scope has duplicate orders");
        }
        Ok(dups)
    }
}

// ============================================================================
// Tests
// ============================================================================
