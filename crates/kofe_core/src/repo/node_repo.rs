//! Content-tree node repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the node arena: ids plus `parent_uuid` links.
//! - Keep child ordering and subtree queries inside the repository boundary.
//!
//! # Invariants
//! - Child listing is deterministic: `sort_order ASC, seq ASC`.
//! - New and reparented nodes are appended as the last child.
//! - Reparenting is a single-row update; a node is never observable under
//!   two parents or none.

use crate::model::node::{NewNode, Node, NodeId};
use crate::repo::{
    bool_to_int, ensure_connection_ready, parse_flag, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const NODE_SELECT_SQL: &str = "SELECT
    uuid,
    parent_uuid,
    note,
    is_active,
    sort_order
FROM nodes";

/// Repository interface for the node arena.
pub trait NodeRepository {
    /// Creates one node as the last child of `node.parent_id`.
    fn insert_node(&self, node: &NewNode) -> RepoResult<Node>;
    /// Loads one node by id.
    fn get_node(&self, id: NodeId) -> RepoResult<Option<Node>>;
    /// Lists every node in creation order, optionally only active ones.
    fn list_nodes(&self, active_only: bool) -> RepoResult<Vec<Node>>;
    /// Lists direct children of `parent_id` (`None` lists roots).
    fn list_children(&self, parent_id: Option<NodeId>) -> RepoResult<Vec<Node>>;
    fn count_nodes(&self) -> RepoResult<usize>;
    /// Overwrites the node's own `active` and `note` fields.
    fn update_fields(&self, id: NodeId, active: bool, note: &str) -> RepoResult<()>;
    /// Moves the node under `parent_id` as its last child.
    fn reparent(&self, id: NodeId, parent_id: Option<NodeId>) -> RepoResult<()>;
    /// Returns `id` and all its descendants, shallowest first.
    fn subtree_ids(&self, id: NodeId) -> RepoResult<Vec<NodeId>>;
    /// Removes the given nodes, processing the list back to front.
    ///
    /// Callers pass `subtree_ids` output so children go before parents.
    fn delete_nodes(&self, ids: &[NodeId]) -> RepoResult<()>;
}

/// SQLite-backed node repository.
pub struct SqliteNodeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNodeRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "nodes")?;
        Ok(Self { conn })
    }

    fn collect(&self, sql: &str, args: impl rusqlite::Params) -> RepoResult<Vec<Node>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(args)?;
        let mut nodes = Vec::new();
        while let Some(row) = rows.next()? {
            nodes.push(parse_node_row(row)?);
        }
        Ok(nodes)
    }
}

impl NodeRepository for SqliteNodeRepository<'_> {
    fn insert_node(&self, node: &NewNode) -> RepoResult<Node> {
        let id = Uuid::new_v4();
        let parent = node.parent_id.map(|value| value.to_string());
        self.conn.execute(
            "INSERT INTO nodes (
                uuid,
                parent_uuid,
                note,
                is_active,
                sort_order
            ) VALUES (
                ?1,
                ?2,
                ?3,
                ?4,
                (SELECT COALESCE(MAX(sort_order), -1) + 1 FROM nodes WHERE parent_uuid IS ?2)
            );",
            params![id.to_string(), parent, node.note.as_str(), bool_to_int(node.active)],
        )?;
        self.get_node(id)?.ok_or(RepoError::NodeNotFound(id))
    }

    fn get_node(&self, id: NodeId) -> RepoResult<Option<Node>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NODE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_node_row(row)?));
        }
        Ok(None)
    }

    fn list_nodes(&self, active_only: bool) -> RepoResult<Vec<Node>> {
        self.collect(
            &format!(
                "{NODE_SELECT_SQL}
                 WHERE (?1 = 0 OR is_active = 1)
                 ORDER BY seq ASC;"
            ),
            [bool_to_int(active_only)],
        )
    }

    fn list_children(&self, parent_id: Option<NodeId>) -> RepoResult<Vec<Node>> {
        self.collect(
            &format!(
                "{NODE_SELECT_SQL}
                 WHERE parent_uuid IS ?1
                 ORDER BY sort_order ASC, seq ASC;"
            ),
            [parent_id.map(|value| value.to_string())],
        )
    }

    fn count_nodes(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM nodes;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn update_fields(&self, id: NodeId, active: bool, note: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE nodes
             SET is_active = ?2,
                 note = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), bool_to_int(active), note],
        )?;
        if changed == 0 {
            return Err(RepoError::NodeNotFound(id));
        }
        Ok(())
    }

    fn reparent(&self, id: NodeId, parent_id: Option<NodeId>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE nodes
             SET parent_uuid = ?2,
                 sort_order = (
                     SELECT COALESCE(MAX(sort_order), -1) + 1
                     FROM nodes
                     WHERE parent_uuid IS ?2
                       AND uuid <> ?1
                 ),
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), parent_id.map(|value| value.to_string())],
        )?;
        if changed == 0 {
            return Err(RepoError::NodeNotFound(id));
        }
        Ok(())
    }

    fn subtree_ids(&self, id: NodeId) -> RepoResult<Vec<NodeId>> {
        let mut stmt = self.conn.prepare(
            "WITH RECURSIVE subtree(uuid, depth) AS (
                SELECT uuid, 0
                FROM nodes
                WHERE uuid = ?1
                UNION ALL
                SELECT child.uuid, parent.depth + 1
                FROM nodes child
                INNER JOIN subtree parent ON child.parent_uuid = parent.uuid
            )
            SELECT subtree.uuid
            FROM subtree
            INNER JOIN nodes ON nodes.uuid = subtree.uuid
            ORDER BY subtree.depth ASC, nodes.sort_order ASC, nodes.seq ASC;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "nodes.uuid")?);
        }
        Ok(ids)
    }

    fn delete_nodes(&self, ids: &[NodeId]) -> RepoResult<()> {
        let mut stmt = self.conn.prepare("DELETE FROM nodes WHERE uuid = ?1;")?;
        for id in ids.iter().rev() {
            if stmt.execute([id.to_string()])? == 0 {
                return Err(RepoError::NodeNotFound(*id));
            }
        }
        Ok(())
    }
}

fn parse_node_row(row: &Row<'_>) -> RepoResult<Node> {
    let uuid_text: String = row.get("uuid")?;
    let parent_id = row
        .get::<_, Option<String>>("parent_uuid")?
        .map(|value| parse_uuid(&value, "nodes.parent_uuid"))
        .transpose()?;

    Ok(Node {
        id: parse_uuid(&uuid_text, "nodes.uuid")?,
        parent_id,
        active: parse_flag(row.get("is_active")?, "nodes.is_active")?,
        note: row.get("note")?,
        sort_order: row.get("sort_order")?,
    })
}
