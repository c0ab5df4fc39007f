//! Database query modules.
//!
//! Generic lookups that work for any mapped [`Entity`] live here; the
//! entity-specific writes and joins are grouped per table:
//! - publishers: Publisher inserts, renames, and name lookup
//! - books: Book inserts, updates, and publisher-scoped queries

pub mod books;
pub mod publishers;

use rusqlite::{Connection, OptionalExtension};

use bookstore_common::Result;

use crate::entity::Entity;
use crate::error::from_rusqlite;

/// Get an entity by identity.
///
/// # Returns
///
/// * `Ok(Some(E))` - The entity if found
/// * `Ok(None)` - If no row has this identity
/// * `Err(Error)` - If a database error occurs
pub fn get_by_id<E: Entity>(conn: &Connection, id: E::Id) -> Result<Option<E>> {
    let raw: i64 = id.into();
    let sql = format!("SELECT {} FROM {} WHERE id = ?1", E::COLUMNS, E::TABLE);

    conn.query_row(&sql, [raw], E::from_row)
        .optional()
        .map_err(from_rusqlite)
}

/// List all rows of an entity ordered by identity.
pub fn list_all<E: Entity>(conn: &Connection) -> Result<Vec<E>> {
    let sql = format!("SELECT {} FROM {} ORDER BY id", E::COLUMNS, E::TABLE);
    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;

    let rows = stmt
        .query_map([], E::from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(rows)
}

/// Delete an entity by identity.
///
/// Foreign keys declared with `ON DELETE CASCADE` remove dependent rows.
///
/// # Returns
///
/// * `Ok(true)` - If the row was deleted
/// * `Ok(false)` - If no row had this identity
/// * `Err(Error)` - If a database error occurs
pub fn delete_by_id<E: Entity>(conn: &Connection, id: E::Id) -> Result<bool> {
    let raw: i64 = id.into();
    let sql = format!("DELETE FROM {} WHERE id = ?1", E::TABLE);

    let rows_affected = conn.execute(&sql, [raw]).map_err(from_rusqlite)?;
    Ok(rows_affected > 0)
}

/// Count rows of an entity.
pub fn count<E: Entity>(conn: &Connection) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
    conn.query_row(&sql, [], |row| row.get(0))
        .map_err(from_rusqlite)
}
