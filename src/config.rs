//! Engine configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! { "duplicate_policy": "recompact", "vocabulary": { "order": "urn:x:position" } }
//! ```

use serde::{Deserialize, Serialize};

use crate::model::Vocabulary;
use crate::Result;

/// What to do when a scope holds two siblings with the same order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the stable encounter-order tie-break and carry on.
    #[default]
    Tolerate,
    /// Renumber the scope densely before a move or drop touches it.
    Recompact,
}

/// Configuration for an [`OrderingEngine`](crate::OrderingEngine).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    pub vocabulary: Vocabulary,
    pub duplicate_policy: DuplicatePolicy,
}

impl OrderingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
