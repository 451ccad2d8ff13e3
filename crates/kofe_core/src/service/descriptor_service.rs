//! Descriptor read/update use-case service.
//!
//! # Invariants
//! - This service never creates or deletes descriptors; only the matrix
//!   expansion creates them and only owner deletion removes them.

use crate::model::descriptor::{Descriptor, DescriptorEdit, DescriptorId};
use crate::model::language::LanguageId;
use crate::model::node::NodeId;
use crate::repo::descriptor_repo::DescriptorRepository;
use crate::repo::RepoError;
use crate::service::descriptor_matrix::MatrixAudit;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{begin_write, Repos};
use log::{info, warn};
use rusqlite::Connection;

/// Descriptor service facade.
pub struct DescriptorService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> DescriptorService<'conn> {
    /// Creates service over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        Repos::try_new(conn)?;
        Ok(Self { conn })
    }

    pub fn get(&self, id: DescriptorId) -> ServiceResult<Descriptor> {
        let repos = Repos::try_new(self.conn)?;
        repos
            .descriptors
            .get_descriptor(id)?
            .ok_or(ServiceError::DescriptorNotFound(id))
    }

    pub fn list_all(&self) -> ServiceResult<Vec<Descriptor>> {
        let repos = Repos::try_new(self.conn)?;
        Ok(repos.descriptors.list_descriptors()?)
    }

    /// Lists descriptors owned by one node; empty for unknown nodes.
    pub fn list_for_node(&self, node_id: NodeId) -> ServiceResult<Vec<Descriptor>> {
        let repos = Repos::try_new(self.conn)?;
        Ok(repos.descriptors.list_for_node(node_id)?)
    }

    /// Lists descriptors owned by one language; empty for unknown languages.
    pub fn list_for_language(&self, language_id: LanguageId) -> ServiceResult<Vec<Descriptor>> {
        let repos = Repos::try_new(self.conn)?;
        Ok(repos.descriptors.list_for_language(language_id)?)
    }

    /// Overwrites title, brief and full-description reference.
    pub fn update_content(&self, edit: &DescriptorEdit) -> ServiceResult<Descriptor> {
        let tx = begin_write(self.conn)?;
        let result = {
            let repos = Repos::try_new(&tx)?;
            repos.descriptors.update_content(edit).and_then(|()| {
                repos
                    .descriptors
                    .get_descriptor(edit.id)?
                    .ok_or(RepoError::DescriptorNotFound(edit.id))
            })
        };
        match result {
            Ok(descriptor) => {
                tx.commit()?;
                info!(
                    "event=descriptor_update module=descriptor status=ok descriptor={}",
                    edit.id
                );
                Ok(descriptor)
            }
            Err(err) => {
                warn!(
                    "event=descriptor_update module=descriptor status=error descriptor={} error={err}",
                    edit.id
                );
                Err(err.into())
            }
        }
    }

    /// Reports pairs of the node x language grid that are not covered by
    /// exactly one descriptor.
    pub fn audit(&self) -> ServiceResult<MatrixAudit> {
        let repos = Repos::try_new(self.conn)?;
        Ok(repos.matrix().audit()?)
    }
}
