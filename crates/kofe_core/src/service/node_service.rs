//! Content-tree use-case service.
//!
//! # Responsibility
//! - Create nodes and expand their descriptors across every language.
//! - Relocate nodes without ever creating a cycle.
//! - Update node fields and descriptor content in one batch.
//! - Delete whole subtrees together with their descriptors.
//!
//! # Invariants
//! - Parent node must exist when provided.
//! - A node is never its own ancestor, including transitively.
//! - Deleting a node removes its descendants and every descriptor they own.

use crate::model::descriptor::DescriptorId;
use crate::model::node::{NewNode, Node, NodeId, NodeUpdate};
use crate::model::outcome::{Outcome, Refusal};
use crate::repo::descriptor_repo::DescriptorRepository;
use crate::repo::node_repo::NodeRepository;
use crate::repo::RepoError;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{begin_write, Repos};
use crate::view::{build_forest, build_subtree, NodeView};
use log::{debug, info, warn};
use rusqlite::Connection;
use std::collections::HashSet;

/// Ids removed by one node deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDeletion {
    /// Deleted node first, then descendants shallowest first.
    pub node_ids: Vec<NodeId>,
    pub descriptor_ids: Vec<DescriptorId>,
}

/// Content-tree service facade.
pub struct NodeService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> NodeService<'conn> {
    /// Creates service over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        Repos::try_new(conn)?;
        Ok(Self { conn })
    }

    /// Creates one node as the last child of its parent (or as a root) and
    /// gives it an empty descriptor in every language.
    ///
    /// # Errors
    /// - `ParentNotFound` when `request.parent_id` does not resolve.
    pub fn create(&self, request: &NewNode) -> ServiceResult<Outcome<Node>> {
        let tx = begin_write(self.conn)?;
        let (node, expanded) = {
            let repos = Repos::try_new(&tx)?;
            if let Some(parent_id) = request.parent_id {
                repos
                    .nodes
                    .get_node(parent_id)?
                    .ok_or(ServiceError::ParentNotFound(parent_id))?;
            }
            let node = repos.nodes.insert_node(request)?;
            let expanded = repos.matrix().expand_for_new_node(&node)?;
            (node, expanded)
        };
        tx.commit()?;

        let parent = node
            .parent_id
            .map_or_else(|| "null".to_string(), |id| format!("id={id}"));
        info!(
            "event=node_create module=node status=ok node={} parent={parent} descriptors={expanded}",
            node.id
        );
        let message = format!(
            "Node has been added. Parent: {parent}. Expanded {expanded} descriptor(s)"
        );
        Ok(Outcome::done(node, message))
    }

    pub fn get(&self, id: NodeId) -> ServiceResult<Node> {
        let repos = Repos::try_new(self.conn)?;
        load_node(&repos, id)
    }

    pub fn list_all(&self) -> ServiceResult<Vec<Node>> {
        let repos = Repos::try_new(self.conn)?;
        Ok(repos.nodes.list_nodes(false)?)
    }

    pub fn list_active(&self) -> ServiceResult<Vec<Node>> {
        let repos = Repos::try_new(self.conn)?;
        Ok(repos.nodes.list_nodes(true)?)
    }

    /// Lists direct children in order; `None` lists root-level nodes.
    pub fn children(&self, parent_id: Option<NodeId>) -> ServiceResult<Vec<Node>> {
        let repos = Repos::try_new(self.conn)?;
        if let Some(parent_id) = parent_id {
            repos
                .nodes
                .get_node(parent_id)?
                .ok_or(ServiceError::ParentNotFound(parent_id))?;
        }
        Ok(repos.nodes.list_children(parent_id)?)
    }

    /// Returns whether `node_id` may move under `destination_id`.
    ///
    /// Moving to root is always legal. Otherwise the ancestor chain of the
    /// destination must not contain `node_id`.
    pub fn can_relocate(
        &self,
        node_id: NodeId,
        destination_id: Option<NodeId>,
    ) -> ServiceResult<bool> {
        let repos = Repos::try_new(self.conn)?;
        check_relocation(&repos, node_id, destination_id)
    }

    /// Moves a node under a new parent (or to root) as its last child.
    ///
    /// A cycle-creating move is refused without mutation.
    pub fn relocate(
        &self,
        node_id: NodeId,
        destination_id: Option<NodeId>,
    ) -> ServiceResult<Outcome<Node>> {
        let tx = begin_write(self.conn)?;
        let outcome = {
            let repos = Repos::try_new(&tx)?;
            let allowed = check_relocation(&repos, node_id, destination_id)?;
            match (allowed, destination_id) {
                (false, Some(destination_id)) => Outcome::refused(
                    load_node(&repos, node_id)?,
                    Refusal::RelocationCycle {
                        node_id,
                        destination_id,
                    },
                ),
                _ => {
                    repos.nodes.reparent(node_id, destination_id)?;
                    Outcome::done(load_node(&repos, node_id)?, "Node has been relocated")
                }
            }
        };
        tx.commit()?;

        let destination = destination_id.map_or_else(|| "null".to_string(), |id| id.to_string());
        if outcome.is_done() {
            info!(
                "event=node_relocate module=node status=ok node={node_id} destination={destination}"
            );
        } else {
            warn!(
                "event=node_relocate module=node status=refused node={node_id} destination={destination} reason=cycle"
            );
        }
        Ok(outcome)
    }

    /// Updates `active`/`note` and overwrites each referenced descriptor.
    ///
    /// Unknown descriptors do not abort the call: the node's own fields and
    /// every resolvable edit still apply, and the outcome is `Partial` with
    /// one reason per miss.
    ///
    /// # Errors
    /// - `NodeNotFound` when `request.id` does not resolve.
    pub fn update(&self, request: &NodeUpdate) -> ServiceResult<Outcome<Node>> {
        let tx = begin_write(self.conn)?;
        let outcome = {
            let repos = Repos::try_new(&tx)?;
            repos
                .nodes
                .update_fields(request.id, request.active, request.note.as_str())?;

            let mut reasons = Vec::new();
            for edit in &request.descriptors {
                match repos.descriptors.update_content(edit) {
                    Ok(()) => {}
                    Err(RepoError::DescriptorNotFound(descriptor_id)) => {
                        debug!(
                            "event=node_update module=node status=skip node={} descriptor={descriptor_id} reason=descriptor_not_found",
                            request.id
                        );
                        reasons.push(Refusal::DescriptorMissing(descriptor_id));
                    }
                    Err(other) => return Err(other.into()),
                }
            }
            Outcome::from_reasons(
                load_node(&repos, request.id)?,
                "Node has been updated",
                reasons,
            )
        };
        tx.commit()?;

        if outcome.is_done() {
            info!(
                "event=node_update module=node status=ok node={} descriptor_edits={}",
                request.id,
                request.descriptors.len()
            );
        } else {
            warn!(
                "event=node_update module=node status={} node={} descriptor_edits={} refused={}",
                outcome.status(),
                request.id,
                request.descriptors.len(),
                outcome.reasons().len()
            );
        }
        Ok(outcome)
    }

    /// Deletes a node, its whole subtree, and every descriptor they own.
    pub fn delete(&self, id: NodeId) -> ServiceResult<NodeDeletion> {
        let tx = begin_write(self.conn)?;
        let deletion = {
            let repos = Repos::try_new(&tx)?;
            load_node(&repos, id)?;
            let node_ids = repos.nodes.subtree_ids(id)?;
            let descriptor_ids = repos.descriptors.delete_for_nodes(&node_ids)?;
            repos.nodes.delete_nodes(&node_ids)?;
            NodeDeletion {
                node_ids,
                descriptor_ids,
            }
        };
        tx.commit()?;

        info!(
            "event=node_delete module=node status=ok node={id} nodes={} descriptors={}",
            deletion.node_ids.len(),
            deletion.descriptor_ids.len()
        );
        Ok(deletion)
    }

    /// Returns one node with its nested children and descriptors.
    pub fn view(&self, id: NodeId) -> ServiceResult<NodeView> {
        let repos = Repos::try_new(self.conn)?;
        let root = load_node(&repos, id)?;
        Ok(build_subtree(
            root,
            repos.nodes.list_nodes(false)?,
            repos.descriptors.list_descriptors()?,
        ))
    }

    /// Returns every root-level tree.
    pub fn tree(&self, active_only: bool) -> ServiceResult<Vec<NodeView>> {
        let repos = Repos::try_new(self.conn)?;
        Ok(build_forest(
            repos.nodes.list_nodes(false)?,
            repos.descriptors.list_descriptors()?,
            active_only,
        ))
    }
}

fn load_node(repos: &Repos<'_>, id: NodeId) -> ServiceResult<Node> {
    repos
        .nodes
        .get_node(id)?
        .ok_or(ServiceError::NodeNotFound(id))
}

fn check_relocation(
    repos: &Repos<'_>,
    node_id: NodeId,
    destination_id: Option<NodeId>,
) -> ServiceResult<bool> {
    load_node(repos, node_id)?;
    let Some(destination_id) = destination_id else {
        return Ok(true);
    };

    let mut visited = HashSet::new();
    let mut cursor = Some(destination_id);
    while let Some(current) = cursor {
        if current == node_id {
            return Ok(false);
        }
        // A revisit means the stored chain is already cyclic.
        if !visited.insert(current) {
            return Ok(false);
        }
        let ancestor = repos
            .nodes
            .get_node(current)?
            .ok_or(ServiceError::ParentNotFound(current))?;
        cursor = ancestor.parent_id;
    }
    Ok(true)
}
