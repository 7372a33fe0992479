//! RDF terms: the nodes and literals that make up a statement.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::vocab;

/// A node or value in the triple store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Term {
    /// Named node.
    Iri(String),
    /// Blank node, identified by its label (without the `_:` prefix).
    Blank(String),
    Literal(Literal),
}

/// A literal value with its datatype and optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    pub datatype: String,
    pub language: Option<String>,
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn blank(label: impl Into<String>) -> Self {
        Term::Blank(label.into())
    }

    /// Plain `xsd:string` literal.
    pub fn string(value: impl Into<String>) -> Self {
        Term::Literal(Literal {
            lexical: value.into(),
            datatype: vocab::XSD_STRING.to_string(),
            language: None,
        })
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal(Literal {
            lexical: lexical.into(),
            datatype: datatype.into(),
            language: None,
        })
    }

    /// Can this term appear as a subject (and so name an entity)?
    pub fn is_node(&self) -> bool {
        matches!(self, Term::Iri(_) | Term::Blank(_))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(label) => write!(f, "_:{label}"),
            Term::Literal(lit) => match &lit.language {
                Some(lang) => write!(f, "\"{}\"@{lang}", lit.lexical),
                None => write!(f, "\"{}\"^^<{}>", lit.lexical, lit.datatype),
            },
        }
    }
}

impl From<&str> for Term {
    /// `_:label` becomes a blank node, anything else an IRI.
    fn from(s: &str) -> Self {
        match s.strip_prefix("_:") {
            Some(label) => Term::Blank(label.to_string()),
            None => Term::Iri(s.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_distinguishes_blank_nodes() {
        assert_eq!(Term::from("_:b1"), Term::blank("b1"));
        assert_eq!(Term::from("http://example.org/A"), Term::iri("http://example.org/A"));
    }

    #[test]
    fn display_uses_turtle_like_forms() {
        assert_eq!(Term::blank("p").to_string(), "_:p");
        assert_eq!(Term::iri("urn:x").to_string(), "<urn:x>");
        assert_eq!(
            Term::typed("3", vocab::XSD_INTEGER).to_string(),
            format!("\"3\"^^<{}>", vocab::XSD_INTEGER)
        );
    }

    #[test]
    fn literals_are_not_nodes() {
        assert!(!Term::string("x").is_node());
        assert!(Term::blank("x").is_node());
    }
}
