//! Language registry repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listing order is creation order (`seq ASC`).
//! - The store refuses a second `is_default` row and a default row that is
//!   inactive, so flag changes must clear before they set.

use crate::model::language::{Language, LanguageId};
use crate::repo::{
    bool_to_int, ensure_connection_ready, parse_flag, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const LANGUAGE_SELECT_SQL: &str = "SELECT
    uuid,
    code,
    name,
    note,
    is_initial,
    is_default,
    is_active
FROM languages";

/// Repository interface for the language registry.
pub trait LanguageRepository {
    /// Persists a new language, flags included.
    fn insert_language(&self, language: &Language) -> RepoResult<()>;
    /// Overwrites code, name and note.
    fn update_basics(&self, id: LanguageId, code: &str, name: &str, note: &str)
        -> RepoResult<()>;
    /// Sets the `active` flag.
    fn set_active(&self, id: LanguageId, active: bool) -> RepoResult<()>;
    /// Clears `bydefault` wherever it is set. Returns affected rows.
    fn clear_default(&self) -> RepoResult<usize>;
    /// Sets `bydefault` on one language.
    fn set_default(&self, id: LanguageId) -> RepoResult<()>;
    /// Loads one language by id.
    fn get_language(&self, id: LanguageId) -> RepoResult<Option<Language>>;
    /// Loads the earliest-created language.
    fn first_language(&self) -> RepoResult<Option<Language>>;
    /// Loads the language flagged `bydefault`.
    fn default_language(&self) -> RepoResult<Option<Language>>;
    /// Lists languages in creation order, optionally only active ones.
    fn list_languages(&self, active_only: bool) -> RepoResult<Vec<Language>>;
    fn count_languages(&self) -> RepoResult<usize>;
    fn count_active_languages(&self) -> RepoResult<usize>;
    /// Removes one language row. Descriptors must be gone already.
    fn delete_language(&self, id: LanguageId) -> RepoResult<()>;
}

/// SQLite-backed language repository.
pub struct SqliteLanguageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLanguageRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "languages")?;
        Ok(Self { conn })
    }

    fn query_one(&self, filter: &str, args: impl rusqlite::Params) -> RepoResult<Option<Language>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LANGUAGE_SELECT_SQL} {filter}"))?;
        let mut rows = stmt.query(args)?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_language_row(row)?));
        }
        Ok(None)
    }
}

impl LanguageRepository for SqliteLanguageRepository<'_> {
    fn insert_language(&self, language: &Language) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO languages (
                uuid,
                code,
                name,
                note,
                is_initial,
                is_default,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                language.id.to_string(),
                language.code.as_str(),
                language.name.as_str(),
                language.note.as_str(),
                bool_to_int(language.initial),
                bool_to_int(language.bydefault),
                bool_to_int(language.active),
            ],
        )?;
        Ok(())
    }

    fn update_basics(
        &self,
        id: LanguageId,
        code: &str,
        name: &str,
        note: &str,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE languages
             SET code = ?2,
                 name = ?3,
                 note = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), code, name, note],
        )?;
        if changed == 0 {
            return Err(RepoError::LanguageNotFound(id));
        }
        Ok(())
    }

    fn set_active(&self, id: LanguageId, active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE languages
             SET is_active = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), bool_to_int(active)],
        )?;
        if changed == 0 {
            return Err(RepoError::LanguageNotFound(id));
        }
        Ok(())
    }

    fn clear_default(&self) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE languages
             SET is_default = 0,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE is_default = 1;",
            [],
        )?;
        Ok(changed)
    }

    fn set_default(&self, id: LanguageId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE languages
             SET is_default = 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::LanguageNotFound(id));
        }
        Ok(())
    }

    fn get_language(&self, id: LanguageId) -> RepoResult<Option<Language>> {
        self.query_one("WHERE uuid = ?1;", [id.to_string()])
    }

    fn first_language(&self) -> RepoResult<Option<Language>> {
        self.query_one("ORDER BY seq ASC LIMIT 1;", [])
    }

    fn default_language(&self) -> RepoResult<Option<Language>> {
        self.query_one("WHERE is_default = 1 LIMIT 1;", [])
    }

    fn list_languages(&self, active_only: bool) -> RepoResult<Vec<Language>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LANGUAGE_SELECT_SQL}
             WHERE (?1 = 0 OR is_active = 1)
             ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([bool_to_int(active_only)])?;
        let mut languages = Vec::new();
        while let Some(row) = rows.next()? {
            languages.push(parse_language_row(row)?);
        }
        Ok(languages)
    }

    fn count_languages(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM languages;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_active_languages(&self) -> RepoResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM languages WHERE is_active = 1;",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn delete_language(&self, id: LanguageId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM languages WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::LanguageNotFound(id));
        }
        Ok(())
    }
}

fn parse_language_row(row: &Row<'_>) -> RepoResult<Language> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Language {
        id: parse_uuid(&uuid_text, "languages.uuid")?,
        code: row.get("code")?,
        name: row.get("name")?,
        note: row.get("note")?,
        initial: parse_flag(row.get("is_initial")?, "languages.is_initial")?,
        bydefault: parse_flag(row.get("is_default")?, "languages.is_default")?,
        active: parse_flag(row.get("is_active")?, "languages.is_active")?,
    })
}
