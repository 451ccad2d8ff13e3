//! Descriptor domain model.
//!
//! # Invariants
//! - Exactly one descriptor exists per (node, language) pair.
//! - `full_descr` is an opaque locator for an external body and is never
//!   interpreted by core.

use crate::model::language::LanguageId;
use crate::model::node::NodeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable descriptor identifier.
pub type DescriptorId = Uuid;

/// Localized content record for one (node, language) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub id: DescriptorId,
    pub node_id: NodeId,
    pub language_id: LanguageId,
    pub title: String,
    pub brief: String,
    pub full_descr: Option<String>,
}

impl Descriptor {
    /// Creates an empty descriptor linking `node_id` and `language_id`.
    pub fn empty(node_id: NodeId, language_id: LanguageId) -> Self {
        Self {
            id: Uuid::new_v4(),
            node_id,
            language_id,
            title: String::new(),
            brief: String::new(),
            full_descr: None,
        }
    }
}

/// Content overwrite for one existing descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorEdit {
    pub id: DescriptorId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub brief: String,
    #[serde(default)]
    pub full_descr: Option<String>,
}
