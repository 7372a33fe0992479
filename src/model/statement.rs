//! Statements (triples) and the wildcard patterns used to query them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Term;

/// A single `(subject, predicate, object)` fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Statement {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self { subject, predicate, object }
    }

    /// Does this statement mention `term` as subject or object?
    pub fn mentions(&self, term: &Term) -> bool {
        &self.subject == term || &self.object == term
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// A triple pattern. `None` positions are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    pub subject: Option<Term>,
    pub predicate: Option<Term>,
    pub object: Option<Term>,
}

impl Pattern {
    /// Matches every statement.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: &Term) -> Self {
        self.subject = Some(subject.clone());
        self
    }

    pub fn predicate(mut self, predicate: &Term) -> Self {
        self.predicate = Some(predicate.clone());
        self
    }

    pub fn object(mut self, object: &Term) -> Self {
        self.object = Some(object.clone());
        self
    }

    pub fn matches(&self, statement: &Statement) -> bool {
        self.subject.as_ref().is_none_or(|s| *s == statement.subject)
            && self.predicate.as_ref().is_none_or(|p| *p == statement.predicate)
            && self.object.as_ref().is_none_or(|o| *o == statement.object)
    }
}
