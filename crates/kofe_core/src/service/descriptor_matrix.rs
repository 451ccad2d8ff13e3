//! Descriptor matrix: keeps the node x language grid dense.
//!
//! # Responsibility
//! - Create one empty descriptor per node when a language is added, and one
//!   per language when a node is added.
//! - Audit the grid for missing or duplicated pairs.
//!
//! # Invariants
//! - The two `expand_*` calls are the only producers of descriptors.
//! - Expansion runs inside the caller's transaction. A failure part-way
//!   propagates and the whole transaction rolls back, so a retry re-runs the
//!   expansion from scratch.

use crate::model::descriptor::Descriptor;
use crate::model::language::{Language, LanguageId};
use crate::model::node::{Node, NodeId};
use crate::repo::descriptor_repo::{DescriptorRepository, PairCoverage};
use crate::repo::language_repo::LanguageRepository;
use crate::repo::node_repo::NodeRepository;
use crate::repo::RepoResult;
use log::debug;

/// Density report for the descriptor grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixAudit {
    pub nodes: usize,
    pub languages: usize,
    /// Pairs with no descriptor.
    pub missing: Vec<(NodeId, LanguageId)>,
    /// Pairs with more than one descriptor.
    pub duplicated: Vec<PairCoverage>,
}

impl MatrixAudit {
    pub fn is_dense(&self) -> bool {
        self.missing.is_empty() && self.duplicated.is_empty()
    }
}

/// Grid maintenance over the three repositories.
///
/// Driven only by node and language creation.
pub(crate) struct DescriptorMatrix<'r, N, L, D> {
    nodes: &'r N,
    languages: &'r L,
    descriptors: &'r D,
}

impl<'r, N, L, D> DescriptorMatrix<'r, N, L, D>
where
    N: NodeRepository,
    L: LanguageRepository,
    D: DescriptorRepository,
{
    pub fn new(nodes: &'r N, languages: &'r L, descriptors: &'r D) -> Self {
        Self {
            nodes,
            languages,
            descriptors,
        }
    }

    /// Adds an empty descriptor for `language` to every existing node.
    ///
    /// Returns the number of nodes covered.
    pub fn expand_for_new_language(&self, language: &Language) -> RepoResult<usize> {
        let nodes = self.nodes.list_nodes(false)?;
        for node in &nodes {
            self.descriptors
                .insert_descriptor(&Descriptor::empty(node.id, language.id))?;
        }
        debug!(
            "event=matrix_expand module=matrix axis=language language={} nodes={}",
            language.id,
            nodes.len()
        );
        Ok(nodes.len())
    }

    /// Adds an empty descriptor for `node` in every existing language.
    ///
    /// Returns the number of descriptors created.
    pub fn expand_for_new_node(&self, node: &Node) -> RepoResult<usize> {
        let languages = self.languages.list_languages(false)?;
        for language in &languages {
            self.descriptors
                .insert_descriptor(&Descriptor::empty(node.id, language.id))?;
        }
        debug!(
            "event=matrix_expand module=matrix axis=node node={} languages={}",
            node.id,
            languages.len()
        );
        Ok(languages.len())
    }

    /// Reports every pair that does not have exactly one descriptor.
    pub fn audit(&self) -> RepoResult<MatrixAudit> {
        let coverage = self.descriptors.pair_coverage()?;
        let missing = coverage
            .iter()
            .filter(|pair| pair.descriptors == 0)
            .map(|pair| (pair.node_id, pair.language_id))
            .collect();
        let duplicated = coverage
            .into_iter()
            .filter(|pair| pair.descriptors > 1)
            .collect();

        Ok(MatrixAudit {
            nodes: self.nodes.count_nodes()?,
            languages: self.languages.count_languages()?,
            missing,
            duplicated,
        })
    }
}
