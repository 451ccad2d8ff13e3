//! Tree payload shaping for transport collaborators.
//!
//! # Responsibility
//! - Assemble flat node/descriptor rows into nested `NodeView` trees.
//!
//! # Invariants
//! - Children appear in `sort_order` order.
//! - With `active_only`, an inactive node hides its whole subtree.

use crate::model::descriptor::{Descriptor, DescriptorId};
use crate::model::language::LanguageId;
use crate::model::node::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One localized descriptor inside a node payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorView {
    pub id: DescriptorId,
    pub language_id: LanguageId,
    pub title: String,
    pub brief: String,
    pub full_descr: Option<String>,
}

impl From<Descriptor> for DescriptorView {
    fn from(value: Descriptor) -> Self {
        Self {
            id: value.id,
            language_id: value.language_id,
            title: value.title,
            brief: value.brief,
            full_descr: value.full_descr,
        }
    }
}

/// Node payload with nested children and descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub active: bool,
    pub note: String,
    pub children: Vec<NodeView>,
    pub descriptors: Vec<DescriptorView>,
}

impl NodeView {
    /// Number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(NodeView::node_count)
            .sum::<usize>()
    }
}

struct TreeIndex {
    children: HashMap<Option<NodeId>, Vec<Node>>,
    descriptors: HashMap<NodeId, Vec<Descriptor>>,
    active_only: bool,
}

impl TreeIndex {
    fn new(nodes: Vec<Node>, descriptors: Vec<Descriptor>, active_only: bool) -> Self {
        let mut children: HashMap<Option<NodeId>, Vec<Node>> = HashMap::new();
        for node in nodes {
            children.entry(node.parent_id).or_default().push(node);
        }
        for siblings in children.values_mut() {
            siblings.sort_by_key(|node| node.sort_order);
        }

        let mut by_node: HashMap<NodeId, Vec<Descriptor>> = HashMap::new();
        for descriptor in descriptors {
            by_node.entry(descriptor.node_id).or_default().push(descriptor);
        }

        Self {
            children,
            descriptors: by_node,
            active_only,
        }
    }

    fn visible(&self, node: &Node) -> bool {
        node.active || !self.active_only
    }

    fn build(&mut self, node: Node) -> NodeView {
        let children: Vec<Node> = self
            .children
            .remove(&Some(node.id))
            .unwrap_or_default()
            .into_iter()
            .filter(|child| self.visible(child))
            .collect();
        let children = children
            .into_iter()
            .map(|child| self.build(child))
            .collect();
        let descriptors = self
            .descriptors
            .remove(&node.id)
            .unwrap_or_default()
            .into_iter()
            .map(DescriptorView::from)
            .collect();

        NodeView {
            id: node.id,
            parent_id: node.parent_id,
            active: node.active,
            note: node.note,
            children,
            descriptors,
        }
    }
}

/// Builds every root-level tree.
pub fn build_forest(
    nodes: Vec<Node>,
    descriptors: Vec<Descriptor>,
    active_only: bool,
) -> Vec<NodeView> {
    let mut index = TreeIndex::new(nodes, descriptors, active_only);
    let roots: Vec<Node> = index
        .children
        .remove(&None)
        .unwrap_or_default()
        .into_iter()
        .filter(|root| index.visible(root))
        .collect();
    roots.into_iter().map(|root| index.build(root)).collect()
}

/// Builds the tree rooted at `root`. `nodes` must include the descendants.
pub fn build_subtree(root: Node, nodes: Vec<Node>, descriptors: Vec<Descriptor>) -> NodeView {
    let mut index = TreeIndex::new(nodes, descriptors, false);
    index.build(root)
}
