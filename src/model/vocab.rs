//! Vocabulary IRIs used by the ordering engine.
//!
//! The engine never hard-codes a predicate: it reads them from a
//! [`Vocabulary`], whose default is the SHACL / DASH mapping below.

use serde::{Deserialize, Serialize};

use super::Term;

pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

// Shape structure
pub const SH_PROPERTY: &str = "http://www.w3.org/ns/shacl#property";
pub const SH_ORDER: &str = "http://www.w3.org/ns/shacl#order";
pub const SH_GROUP: &str = "http://www.w3.org/ns/shacl#group";
pub const SH_PROPERTY_GROUP: &str = "http://www.w3.org/ns/shacl#PropertyGroup";

// Property metadata (opaque to ordering)
pub const SH_PATH: &str = "http://www.w3.org/ns/shacl#path";
pub const SH_NAME: &str = "http://www.w3.org/ns/shacl#name";
pub const SH_DATATYPE: &str = "http://www.w3.org/ns/shacl#datatype";
pub const SH_NODE_KIND: &str = "http://www.w3.org/ns/shacl#nodeKind";
pub const DASH_EDITOR: &str = "http://datashapes.org/dash#editor";
pub const DASH_VIEWER: &str = "http://datashapes.org/dash#viewer";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

// Datatypes
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

/// XSD numeric datatypes accepted for `sh:order` values.
const NUMERIC_LOCAL_NAMES: [&str; 16] = [
    "integer",
    "decimal",
    "double",
    "float",
    "int",
    "long",
    "short",
    "byte",
    "nonNegativeInteger",
    "positiveInteger",
    "nonPositiveInteger",
    "negativeInteger",
    "unsignedInt",
    "unsignedLong",
    "unsignedShort",
    "unsignedByte",
];

pub fn is_numeric_datatype(datatype: &str) -> bool {
    datatype
        .strip_prefix(XSD_NS)
        .is_some_and(|local| NUMERIC_LOCAL_NAMES.contains(&local))
}

/// Predicates and classes the engine reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Vocabulary {
    pub has_property: String,
    pub order: String,
    pub group: String,
    pub group_class: String,
    pub rdf_type: String,
    pub label: String,
    pub name: String,
    pub path: String,
    pub datatype: String,
    pub node_kind: String,
    pub editor: String,
    pub viewer: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            has_property: SH_PROPERTY.into(),
            order: SH_ORDER.into(),
            group: SH_GROUP.into(),
            group_class: SH_PROPERTY_GROUP.into(),
            rdf_type: RDF_TYPE.into(),
            label: RDFS_LABEL.into(),
            name: SH_NAME.into(),
            path: SH_PATH.into(),
            datatype: SH_DATATYPE.into(),
            node_kind: SH_NODE_KIND.into(),
            editor: DASH_EDITOR.into(),
            viewer: DASH_VIEWER.into(),
        }
    }
}

impl Vocabulary {
    pub fn has_property(&self) -> Term {
        Term::iri(&self.has_property)
    }

    pub fn order(&self) -> Term {
        Term::iri(&self.order)
    }

    pub fn group(&self) -> Term {
        Term::iri(&self.group)
    }

    pub fn group_class(&self) -> Term {
        Term::iri(&self.group_class)
    }

    pub fn rdf_type(&self) -> Term {
        Term::iri(&self.rdf_type)
    }

    pub fn label(&self) -> Term {
        Term::iri(&self.label)
    }

    pub fn name(&self) -> Term {
        Term::iri(&self.name)
    }

    pub fn path(&self) -> Term {
        Term::iri(&self.path)
    }

    pub fn datatype(&self) -> Term {
        Term::iri(&self.datatype)
    }

    pub fn node_kind(&self) -> Term {
        Term::iri(&self.node_kind)
    }

    pub fn editor(&self) -> Term {
        Term::iri(&self.editor)
    }

    pub fn viewer(&self) -> Term {
        Term::iri(&self.viewer)
    }
}
