//! Order mutator: the only code that writes order and group statements.
//!
//! Every write is a remove/add pair on the store. `set_order` and
//! `set_group` short-circuit when the stored value already matches, so
//! repeated repairs cause no store churn.

use serde::{Deserialize, Serialize};

use crate::accessor::{Accessor, ListEntry, Scope};
use crate::model::{Order, Pattern, Statement, Term, Vocabulary};
use crate::storage::TripleStore;
use crate::Result;

// ============================================================================
// Templates for new entities
// ============================================================================

/// Editor/viewer metadata attached to a freshly created property.
///
/// None of these fields affect ordering; they are written as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyTemplate {
    pub path: Option<String>,
    pub name: Option<String>,
    pub datatype: Option<String>,
    pub node_kind: Option<String>,
    pub editor: Option<String>,
    pub viewer: Option<String>,
}

impl PropertyTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, iri: impl Into<String>) -> Self {
        self.path = Some(iri.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_datatype(mut self, iri: impl Into<String>) -> Self {
        self.datatype = Some(iri.into());
        self
    }

    pub fn with_node_kind(mut self, iri: impl Into<String>) -> Self {
        self.node_kind = Some(iri.into());
        self
    }

    pub fn with_editor(mut self, iri: impl Into<String>) -> Self {
        self.editor = Some(iri.into());
        self
    }

    pub fn with_viewer(mut self, iri: impl Into<String>) -> Self {
        self.viewer = Some(iri.into());
        self
    }

    fn statements(&self, node: &Term, vocab: &Vocabulary) -> Vec<Statement> {
        let iris = [
            (vocab.path(), &self.path),
            (vocab.datatype(), &self.datatype),
            (vocab.node_kind(), &self.node_kind),
            (vocab.editor(), &self.editor),
            (vocab.viewer(), &self.viewer),
        ];
        let mut out: Vec<Statement> = iris
            .into_iter()
            .filter_map(|(p, v)| v.as_ref().map(|iri| Statement::new(node.clone(), p, Term::iri(iri))))
            .collect();
        if let Some(name) = &self.name {
            out.push(Statement::new(node.clone(), vocab.name(), Term::string(name)));
        }
        out
    }
}

// ============================================================================
// Mutator
// ============================================================================

/// Write access to order and group state.
pub struct Mutator<'a, S: TripleStore + ?Sized> {
    store: &'a S,
    vocab: &'a Vocabulary,
}

impl<'a, S: TripleStore + ?Sized> Mutator<'a, S> {
    pub fn new(store: &'a S, vocab: &'a Vocabulary) -> Self {
        Self { store, vocab }
    }

    fn accessor(&self) -> Accessor<'a, S> {
        Accessor::new(self.store, self.vocab)
    }

    /// Replace the entity's order (or clear it with `None`).
    ///
    /// Returns `false` without touching the store when the single stored
    /// order already equals `order`.
    pub fn set_order(&self, entity: &Term, order: Option<Order>) -> Result<bool> {
        let predicate = self.vocab.order();
        let current = self.store.objects(entity, &predicate)?;
        let unchanged = match (order, current.as_slice()) {
            (None, []) => true,
            (Some(new), [only]) => Order::from_term(only) == Some(new),
            _ => false,
        };
        if unchanged {
            return Ok(false);
        }

        self.store
            .remove_matches(&Pattern::any().subject(entity).predicate(&predicate))?;
        if let Some(new) = order {
            self.store.add(Statement::new(entity.clone(), predicate, new.to_term()))?;
        }
        tracing::debug!(%entity, order = ?order.map(Order::value), "set order");
        Ok(true)
    }

    /// Replace the property's group (or clear it with `None`).
    pub fn set_group(&self, property: &Term, group: Option<&Term>) -> Result<bool> {
        let predicate = self.vocab.group();
        let current = self.store.objects(property, &predicate)?;
        let unchanged = match (group, current.as_slice()) {
            (None, []) => true,
            (Some(new), [only]) => only == new,
            _ => false,
        };
        if unchanged {
            return Ok(false);
        }

        self.store
            .remove_matches(&Pattern::any().subject(property).predicate(&predicate))?;
        if let Some(new) = group {
            self.store.add(Statement::new(property.clone(), predicate, new.clone()))?;
        }
        tracing::debug!(%property, group = ?group.map(ToString::to_string), "set group");
        Ok(true)
    }

    /// Create a property under `shape`, optionally inside `group`.
    ///
    /// Without an explicit order the property goes after the last ordered
    /// sibling of its destination scope (order 0 in an empty scope).
    pub fn create_property(
        &self,
        shape: &Term,
        template: &PropertyTemplate,
        group: Option<&Term>,
        order: Option<Order>,
    ) -> Result<Term> {
        let order = match order {
            Some(order) => order,
            None => {
                let scope = match group {
                    Some(g) => Scope::Group { shape: shape.clone(), group: g.clone() },
                    None => Scope::Shape(shape.clone()),
                };
                self.accessor().next_order(&scope)?
            }
        };

        let node = self.store.fresh_blank_node();
        self.store
            .add(Statement::new(shape.clone(), self.vocab.has_property(), node.clone()))?;
        for statement in template.statements(&node, self.vocab) {
            self.store.add(statement)?;
        }
        if let Some(g) = group {
            self.store.add(Statement::new(node.clone(), self.vocab.group(), g.clone()))?;
        }
        self.store.add(Statement::new(node.clone(), self.vocab.order(), order.to_term()))?;

        tracing::debug!(%shape, property = %node, %order, "created property");
        Ok(node)
    }

    /// Create a property group node.
    ///
    /// The group joins a shape's list once one of its properties points at it.
    pub fn create_group(&self, label: Option<&str>, order: Option<Order>) -> Result<Term> {
        let node = self.store.fresh_blank_node();
        self.store
            .add(Statement::new(node.clone(), self.vocab.rdf_type(), self.vocab.group_class()))?;
        if let Some(label) = label {
            self.store.add(Statement::new(node.clone(), self.vocab.label(), Term::string(label)))?;
        }
        if let Some(order) = order {
            self.store.add(Statement::new(node.clone(), self.vocab.order(), order.to_term()))?;
        }
        tracing::debug!(group = %node, "created group");
        Ok(node)
    }

    /// Delete a property and renumber every shape that listed it.
    ///
    /// Returns the shapes that were recompacted.
    pub fn remove_property(&self, property: &Term) -> Result<Vec<Term>> {
        let shapes = self.accessor().owning_shapes(property)?;

        let removed = self.store.remove_matches(&Pattern::any().subject(property))?
            + self.store.remove_matches(&Pattern::any().object(property))?;
        tracing::debug!(%property, statements = removed, "removed property");

        for shape in &shapes {
            self.recalculate(&Scope::Shape(shape.clone()))?;
        }
        Ok(shapes)
    }

    /// Renumber a scope to `0..n-1` in its current sort order.
    ///
    /// A shape scope also renumbers each of its groups' member lists.
    /// Entities without an order are numbered after the ordered ones.
    /// Returns how many order statements changed.
    pub fn recalculate(&self, scope: &Scope) -> Result<usize> {
        let mut changed = 0;
        match scope {
            Scope::Shape(shape) => {
                let list = self.accessor().properties_of_shape(shape)?;
                for (index, entry) in list.iter().enumerate() {
                    changed += usize::from(self.set_order(entry.node(), Some(Order::from(index)))?);
                    if let ListEntry::Group(group) = entry {
                        for (inner, member) in group.properties.iter().enumerate() {
                            changed +=
                                usize::from(self.set_order(&member.node, Some(Order::from(inner)))?);
                        }
                    }
                }
            }
            Scope::Group { .. } => {
                let members = self.accessor().scope_entries(scope)?;
                for (index, member) in members.iter().enumerate() {
                    changed += usize::from(self.set_order(&member.node, Some(Order::from(index)))?);
                }
            }
        }
        if changed > 0 {
            tracing::debug!(?scope, changed, "recalculated scope");
        }
        Ok(changed)
    }

    /// Dissolve `group` within `shape`.
    ///
    /// Its members take the group's place in the top-level list, keeping
    /// their member order, and the top level is renumbered densely. The group
    /// node itself is deleted once no property references it any more.
    pub fn ungroup(&self, shape: &Term, group: &Term) -> Result<bool> {
        let list = self.accessor().properties_of_shape(shape)?;
        let Some(group_view) = list.group(group) else {
            return Ok(false);
        };

        let mut sequence: Vec<Term> = Vec::with_capacity(list.len() + group_view.properties.len());
        for entry in &list {
            match entry {
                ListEntry::Group(g) if &g.node == group => {
                    sequence.extend(g.properties.iter().map(|p| p.node.clone()));
                }
                other => sequence.push(other.node().clone()),
            }
        }

        for member in &group_view.properties {
            self.set_group(&member.node, None)?;
        }
        for (index, node) in sequence.iter().enumerate() {
            self.set_order(node, Some(Order::from(index)))?;
        }

        if self.store.subjects(&self.vocab.group(), group)?.is_empty() {
            self.store.remove_matches(&Pattern::any().subject(group))?;
        }
        tracing::debug!(%shape, %group, "ungrouped");
        Ok(true)
    }

    /// Move every has-property link from `old` to `new`.
    ///
    /// Order and group statements live on the properties, so the display
    /// order survives unchanged. Returns the number of links moved.
    pub fn rename_shape(&self, old: &Term, new: &Term) -> Result<usize> {
        if old == new {
            return Ok(0);
        }
        let predicate = self.vocab.has_property();
        let links = self.store.query(&Pattern::any().subject(old).predicate(&predicate))?;
        for link in &links {
            self.store.remove(link)?;
            self.store
                .add(Statement::new(new.clone(), predicate.clone(), link.object.clone()))?;
        }
        tracing::debug!(%old, %new, links = links.len(), "renamed shape");
        Ok(links.len())
    }
}

// ============================================================================
// Tests
// ============================================================================
