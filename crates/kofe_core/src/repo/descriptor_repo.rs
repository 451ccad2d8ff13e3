//! Descriptor repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `(node_uuid, language_uuid)` is unique at the storage level.
//! - Descriptors are only removed together with their owning node or
//!   language; there is no standalone delete.

use crate::model::descriptor::{Descriptor, DescriptorEdit, DescriptorId};
use crate::model::language::LanguageId;
use crate::model::node::NodeId;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const DESCRIPTOR_SELECT_SQL: &str = "SELECT
    uuid,
    node_uuid,
    language_uuid,
    title,
    brief,
    full_descr
FROM descriptors";

/// Descriptor count for one (node, language) pair of the full grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCoverage {
    pub node_id: NodeId,
    pub language_id: LanguageId,
    pub descriptors: usize,
}

/// Repository interface for descriptors.
pub trait DescriptorRepository {
    fn insert_descriptor(&self, descriptor: &Descriptor) -> RepoResult<()>;
    fn get_descriptor(&self, id: DescriptorId) -> RepoResult<Option<Descriptor>>;
    /// Lists every descriptor in creation order.
    fn list_descriptors(&self) -> RepoResult<Vec<Descriptor>>;
    fn list_for_node(&self, node_id: NodeId) -> RepoResult<Vec<Descriptor>>;
    fn list_for_language(&self, language_id: LanguageId) -> RepoResult<Vec<Descriptor>>;
    /// Overwrites title, brief and full-description reference.
    fn update_content(&self, edit: &DescriptorEdit) -> RepoResult<()>;
    /// Removes every descriptor owned by the given nodes. Returns removed ids.
    fn delete_for_nodes(&self, node_ids: &[NodeId]) -> RepoResult<Vec<DescriptorId>>;
    /// Removes every descriptor owned by one language. Returns removed ids.
    fn delete_for_language(&self, language_id: LanguageId) -> RepoResult<Vec<DescriptorId>>;
    /// Counts descriptors for every node x language pair.
    fn pair_coverage(&self) -> RepoResult<Vec<PairCoverage>>;
}

/// SQLite-backed descriptor repository.
pub struct SqliteDescriptorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDescriptorRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "descriptors")?;
        Ok(Self { conn })
    }

    fn collect(&self, filter: &str, args: impl rusqlite::Params) -> RepoResult<Vec<Descriptor>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DESCRIPTOR_SELECT_SQL} {filter}"))?;
        let mut rows = stmt.query(args)?;
        let mut descriptors = Vec::new();
        while let Some(row) = rows.next()? {
            descriptors.push(parse_descriptor_row(row)?);
        }
        Ok(descriptors)
    }
}

impl DescriptorRepository for SqliteDescriptorRepository<'_> {
    fn insert_descriptor(&self, descriptor: &Descriptor) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO descriptors (
                uuid,
                node_uuid,
                language_uuid,
                title,
                brief,
                full_descr
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                descriptor.id.to_string(),
                descriptor.node_id.to_string(),
                descriptor.language_id.to_string(),
                descriptor.title.as_str(),
                descriptor.brief.as_str(),
                descriptor.full_descr.as_deref(),
            ],
        )?;
        Ok(())
    }

    fn get_descriptor(&self, id: DescriptorId) -> RepoResult<Option<Descriptor>> {
        Ok(self
            .collect("WHERE uuid = ?1;", [id.to_string()])?
            .into_iter()
            .next())
    }

    fn list_descriptors(&self) -> RepoResult<Vec<Descriptor>> {
        self.collect("ORDER BY seq ASC;", [])
    }

    fn list_for_node(&self, node_id: NodeId) -> RepoResult<Vec<Descriptor>> {
        self.collect(
            "WHERE node_uuid = ?1 ORDER BY seq ASC;",
            [node_id.to_string()],
        )
    }

    fn list_for_language(&self, language_id: LanguageId) -> RepoResult<Vec<Descriptor>> {
        self.collect(
            "WHERE language_uuid = ?1 ORDER BY seq ASC;",
            [language_id.to_string()],
        )
    }

    fn update_content(&self, edit: &DescriptorEdit) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE descriptors
             SET title = ?2,
                 brief = ?3,
                 full_descr = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                edit.id.to_string(),
                edit.title.as_str(),
                edit.brief.as_str(),
                edit.full_descr.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::DescriptorNotFound(edit.id));
        }
        Ok(())
    }

    fn delete_for_nodes(&self, node_ids: &[NodeId]) -> RepoResult<Vec<DescriptorId>> {
        let mut removed = Vec::new();
        let mut delete = self
            .conn
            .prepare("DELETE FROM descriptors WHERE node_uuid = ?1;")?;
        for node_id in node_ids {
            removed.extend(self.list_for_node(*node_id)?.into_iter().map(|item| item.id));
            delete.execute([node_id.to_string()])?;
        }
        Ok(removed)
    }

    fn delete_for_language(&self, language_id: LanguageId) -> RepoResult<Vec<DescriptorId>> {
        let removed = self
            .list_for_language(language_id)?
            .into_iter()
            .map(|item| item.id)
            .collect();
        self.conn.execute(
            "DELETE FROM descriptors WHERE language_uuid = ?1;",
            [language_id.to_string()],
        )?;
        Ok(removed)
    }

    fn pair_coverage(&self) -> RepoResult<Vec<PairCoverage>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                n.uuid AS node_uuid,
                l.uuid AS language_uuid,
                COUNT(d.uuid) AS descriptors
             FROM nodes n
             CROSS JOIN languages l
             LEFT JOIN descriptors d
               ON d.node_uuid = n.uuid
              AND d.language_uuid = l.uuid
             GROUP BY n.uuid, l.uuid
             ORDER BY n.seq ASC, l.seq ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut coverage = Vec::new();
        while let Some(row) = rows.next()? {
            let node_text: String = row.get("node_uuid")?;
            let language_text: String = row.get("language_uuid")?;
            let count: i64 = row.get("descriptors")?;
            coverage.push(PairCoverage {
                node_id: parse_uuid(&node_text, "descriptors.node_uuid")?,
                language_id: parse_uuid(&language_text, "descriptors.language_uuid")?,
                descriptors: count as usize,
            });
        }
        Ok(coverage)
    }
}

fn parse_descriptor_row(row: &Row<'_>) -> RepoResult<Descriptor> {
    let uuid_text: String = row.get("uuid")?;
    let node_text: String = row.get("node_uuid")?;
    let language_text: String = row.get("language_uuid")?;
    Ok(Descriptor {
        id: parse_uuid(&uuid_text, "descriptors.uuid")?,
        node_id: parse_uuid(&node_text, "descriptors.node_uuid")?,
        language_id: parse_uuid(&language_text, "descriptors.language_uuid")?,
        title: row.get("title")?,
        brief: row.get("brief")?,
        full_descr: row.get("full_descr")?,
    })
}
