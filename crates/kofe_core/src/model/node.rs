//! Node domain model.
//!
//! # Responsibility
//! - Define the content-tree element and its mutation requests.
//!
//! # Invariants
//! - The parent relation is acyclic; a node is never its own ancestor.
//! - Parent/child links are stored as ids, never as references. Children are
//!   derived from `parent_id` and ordered by `sort_order`.

use crate::model::descriptor::DescriptorEdit;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable content-tree node identifier.
pub type NodeId = Uuid;

/// Content-tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// `None` means root-level node.
    pub parent_id: Option<NodeId>,
    pub active: bool,
    pub note: String,
    /// Position among siblings.
    pub sort_order: i64,
}

impl Node {
    /// Returns whether this node sits at root level.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Request for creating one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewNode {
    pub parent_id: Option<NodeId>,
    pub note: String,
    pub active: bool,
}

impl Default for NewNode {
    fn default() -> Self {
        Self {
            parent_id: None,
            note: String::new(),
            active: true,
        }
    }
}

impl NewNode {
    /// Root-level active node with the given note.
    pub fn root(note: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            ..Self::default()
        }
    }

    /// Active node attached under `parent_id`.
    pub fn child_of(parent_id: NodeId, note: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id),
            note: note.into(),
            ..Self::default()
        }
    }

    /// Sets the requested active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Request for updating a node's own fields plus its descriptors.
///
/// Parent and children are not touched; use relocation for that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeUpdate {
    pub id: NodeId,
    pub active: bool,
    pub note: String,
    #[serde(default)]
    pub descriptors: Vec<DescriptorEdit>,
}
