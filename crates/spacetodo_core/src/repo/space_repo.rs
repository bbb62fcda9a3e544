//! Space/list repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `spaces.slug` is unique; inserts report `Duplicate` instead of a raw
//!   constraint error.
//! - List reads are ordered by `updated_at DESC`.

use crate::db::{ensure_schema_ready, RequiredTable};
use crate::model::space::{List, NewList, Space};
use crate::model::new_id;
use crate::repo::{bool_to_int, int_to_bool, is_unique_violation, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const SPACE_SELECT_SQL: &str = "SELECT id, slug, name FROM spaces";

const LIST_SELECT_SQL: &str = "SELECT
    id,
    space_id,
    owner_id,
    title,
    private,
    updated_at
FROM lists";

const REQUIRED_TABLES: &[RequiredTable] = &[
    RequiredTable {
        name: "spaces",
        columns: &["id", "slug", "name"],
    },
    RequiredTable {
        name: "lists",
        columns: &[
            "id",
            "space_id",
            "owner_id",
            "title",
            "private",
            "updated_at",
        ],
    },
];

/// Repository interface for spaces and their lists.
pub trait SpaceRepository {
    fn create_space(&self, slug: &str, name: &str) -> RepoResult<Space>;
    fn get_space(&self, space_id: &str) -> RepoResult<Option<Space>>;
    fn get_space_by_slug(&self, slug: &str) -> RepoResult<Option<Space>>;
    /// Lists all spaces ordered by name.
    fn list_spaces(&self) -> RepoResult<Vec<Space>>;
    fn create_list(&self, list: &NewList) -> RepoResult<List>;
    fn get_list(&self, list_id: &str) -> RepoResult<Option<List>>;
    /// Lists every list of one space, most recently updated first.
    fn list_lists(&self, space_id: &str) -> RepoResult<Vec<List>>;
    fn count_lists(&self, space_id: &str) -> RepoResult<u32>;
}

/// SQLite-backed space/list repository.
pub struct SqliteSpaceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSpaceRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl SpaceRepository for SqliteSpaceRepository<'_> {
    fn create_space(&self, slug: &str, name: &str) -> RepoResult<Space> {
        let space = Space {
            id: new_id(),
            slug: slug.to_string(),
            name: name.to_string(),
        };
        self.conn
            .execute(
                "INSERT INTO spaces (id, slug, name) VALUES (?1, ?2, ?3);",
                params![space.id.as_str(), space.slug.as_str(), space.name.as_str()],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepoError::Duplicate {
                        entity: "space",
                        key: slug.to_string(),
                    }
                } else {
                    err.into()
                }
            })?;
        Ok(space)
    }

    fn get_space(&self, space_id: &str) -> RepoResult<Option<Space>> {
        query_one_space(self.conn, "id", space_id)
    }

    fn get_space_by_slug(&self, slug: &str) -> RepoResult<Option<Space>> {
        query_one_space(self.conn, "slug", slug)
    }

    fn list_spaces(&self) -> RepoResult<Vec<Space>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SPACE_SELECT_SQL} ORDER BY name ASC, slug ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut spaces = Vec::new();
        while let Some(row) = rows.next()? {
            spaces.push(parse_space_row(row)?);
        }
        Ok(spaces)
    }

    fn create_list(&self, list: &NewList) -> RepoResult<List> {
        let id = new_id();
        self.conn.execute(
            "INSERT INTO lists (
                id,
                space_id,
                owner_id,
                title,
                private
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.as_str(),
                list.space_id.as_str(),
                list.owner_id.as_str(),
                list.title.as_str(),
                bool_to_int(list.private),
            ],
        )?;
        self.get_list(&id)?
            .ok_or_else(|| RepoError::not_found("list", &id))
    }

    fn get_list(&self, list_id: &str) -> RepoResult<Option<List>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LIST_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([list_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_list_row(row)?));
        }
        Ok(None)
    }

    fn list_lists(&self, space_id: &str) -> RepoResult<Vec<List>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LIST_SELECT_SQL}
             WHERE space_id = ?1
             ORDER BY updated_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([space_id])?;
        let mut lists = Vec::new();
        while let Some(row) = rows.next()? {
            lists.push(parse_list_row(row)?);
        }
        Ok(lists)
    }

    fn count_lists(&self, space_id: &str) -> RepoResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM lists WHERE space_id = ?1;",
            [space_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn query_one_space(
    conn: &Connection,
    column: &'static str,
    value: &str,
) -> RepoResult<Option<Space>> {
    let mut stmt = conn.prepare(&format!("{SPACE_SELECT_SQL} WHERE {column} = ?1;"))?;
    let mut rows = stmt.query([value])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_space_row(row)?));
    }
    Ok(None)
}

fn parse_space_row(row: &Row<'_>) -> RepoResult<Space> {
    Ok(Space {
        id: row.get("id")?,
        slug: row.get("slug")?,
        name: row.get("name")?,
    })
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<List> {
    Ok(List {
        id: row.get("id")?,
        space_id: row.get("space_id")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        private: int_to_bool(row.get("private")?, "lists.private")?,
        updated_at: row.get("updated_at")?,
    })
}
