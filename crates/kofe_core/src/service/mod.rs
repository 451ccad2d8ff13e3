//! Content engine use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own the atomic unit: every mutating call runs in one IMMEDIATE
//!   transaction that repositories and the descriptor matrix share.
//!
//! # Invariants
//! - Node and language creation complete only together with their matrix
//!   expansion; both commit or neither does.

use crate::repo::descriptor_repo::SqliteDescriptorRepository;
use crate::repo::language_repo::SqliteLanguageRepository;
use crate::repo::node_repo::SqliteNodeRepository;
use crate::repo::RepoResult;
use rusqlite::{Connection, Transaction, TransactionBehavior};

pub mod descriptor_matrix;
pub mod descriptor_service;
pub mod error;
pub mod language_service;
pub mod node_service;

use descriptor_matrix::DescriptorMatrix;

pub(crate) type SqliteMatrix<'r, 'conn> = DescriptorMatrix<
    'r,
    SqliteNodeRepository<'conn>,
    SqliteLanguageRepository<'conn>,
    SqliteDescriptorRepository<'conn>,
>;

/// The three repositories bound to one connection or transaction.
pub(crate) struct Repos<'conn> {
    pub languages: SqliteLanguageRepository<'conn>,
    pub nodes: SqliteNodeRepository<'conn>,
    pub descriptors: SqliteDescriptorRepository<'conn>,
}

impl<'conn> Repos<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            languages: SqliteLanguageRepository::try_new(conn)?,
            nodes: SqliteNodeRepository::try_new(conn)?,
            descriptors: SqliteDescriptorRepository::try_new(conn)?,
        })
    }

    pub fn matrix(&self) -> SqliteMatrix<'_, 'conn> {
        DescriptorMatrix::new(&self.nodes, &self.languages, &self.descriptors)
    }
}

/// Starts the write transaction for one use-case call.
///
/// Immediate mode takes the write lock up front, so count-then-mutate rules
/// ("is this the last active language?") see a stable store.
pub(crate) fn begin_write(conn: &Connection) -> rusqlite::Result<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
}
